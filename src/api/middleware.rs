use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::{Cookie, Cookies, Key};

use super::error::ApiError;

pub const SESSION_COOKIE: &str = "slimjourney_user";

pub fn session_cookie(user_id: i32) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, user_id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie
}

pub fn start_session(cookies: &Cookies, key: &Key, user_id: i32) {
    cookies.signed(key).add(session_cookie(user_id));
}

pub fn end_session(cookies: &Cookies, key: &Key) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookies.signed(key).remove(cookie);
}

pub async fn auth_middleware(
    Extension(key): Extension<Key>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = cookies.signed(&key).get(SESSION_COOKIE) {
        if let Ok(user_id) = cookie.value().parse::<i32>() {
            tracing::Span::current().record("user_id", user_id);
            request.extensions_mut().insert(user_id);
            return next.run(request).await;
        }
    }
    ApiError::Unauthorized.into_response()
}
