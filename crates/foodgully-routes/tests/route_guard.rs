//! Route guard behavior across every session state.

use foodgully_protocol::{ProviderUser, UserIdentity};
use foodgully_routes::{GuardDecision, Navigation, Route, guard, navigate, post_login_target};
use foodgully_session::Session;

fn alice() -> Session {
    Session::authenticated(UserIdentity::from_provider(&ProviderUser {
        uid: "alice".into(),
        email: "alice@example.com".into(),
        display_name: Some("Alice".into()),
        photo_url: None,
        access_token: "provider".into(),
    }))
}

// =========================================================================
// guard() on /add-food
// =========================================================================

#[test]
fn test_guard_initializing_shows_loading() {
    assert_eq!(guard(&Session::initializing(), "/add-food"), GuardDecision::Loading);
}

#[test]
fn test_guard_authenticated_renders() {
    assert_eq!(guard(&alice(), "/add-food"), GuardDecision::Render);
}

#[test]
fn test_guard_unauthenticated_redirects_to_login() {
    assert_eq!(
        guard(&Session::unauthenticated(), "/add-food"),
        GuardDecision::Redirect {
            to: "/login",
            from: "/add-food".into(),
        }
    );
}

// =========================================================================
// navigate()
// =========================================================================

#[test]
fn test_navigate_protected_routes_follow_session() {
    for path in ["/add-food", "/manage-foods", "/my-requests", "/food/42"] {
        let route = Route::parse(path).unwrap();
        assert_eq!(navigate(&Session::initializing(), path).unwrap(), Navigation::Loading);
        assert_eq!(navigate(&alice(), path).unwrap(), Navigation::Show(route));
        assert_eq!(
            navigate(&Session::unauthenticated(), path).unwrap(),
            Navigation::Redirect {
                to: "/login",
                from: path.into(),
            }
        );
    }
}

#[test]
fn test_navigate_login_and_not_found_always_show() {
    let signed_out = Session::unauthenticated();
    assert_eq!(navigate(&signed_out, "/login").unwrap(), Navigation::Show(Route::Login));
    assert_eq!(
        navigate(&signed_out, "/missing").unwrap(),
        Navigation::Show(Route::NotFound { path: "/missing".into() })
    );
}

#[test]
fn test_redirect_then_sign_in_returns_to_requested_view() {
    let Navigation::Redirect { from, .. } =
        navigate(&Session::unauthenticated(), "/my-requests").unwrap()
    else {
        panic!("expected a redirect");
    };

    let target = post_login_target(Some(&from));

    assert_eq!(target, "/my-requests");
    assert_eq!(
        navigate(&alice(), &target).unwrap(),
        Navigation::Show(Route::MyRequests)
    );
}
