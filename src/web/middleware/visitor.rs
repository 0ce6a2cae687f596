use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use cookie::{time::Duration, Cookie, SameSite};
use tracing::warn;
use uuid::Uuid;

pub const DEVICE_COOKIE: &str = "device_id";
pub const SESSION_COOKIE: &str = "session_id";

const DEVICE_COOKIE_DAYS: i64 = 400;

/// Who is on the other end: a long-lived device (for "my tickets") and the
/// current browser session (for the in-progress registration).
#[derive(Clone, Debug)]
pub struct Visitor {
    pub device_id: String,
    pub session_id: String,
}

pub async fn identify_visitor(mut request: Request, next: Next) -> Response {
    let cookies = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .unwrap_or("")
        .to_string();

    let device_id = read_cookie(&cookies, DEVICE_COOKIE);
    let session_id = read_cookie(&cookies, SESSION_COOKIE);

    let visitor = Visitor {
        device_id: device_id.clone().unwrap_or_else(new_id),
        session_id: session_id.clone().unwrap_or_else(new_id),
    };
    request.extensions_mut().insert(visitor.clone());

    let mut response = next.run(request).await;

    if device_id.is_none() {
        let mut cookie = base_cookie(DEVICE_COOKIE, visitor.device_id);
        cookie.set_max_age(Duration::days(DEVICE_COOKIE_DAYS));
        append_cookie(&mut response, cookie);
    }
    if session_id.is_none() {
        // No max-age: the browser drops it when the session ends.
        append_cookie(&mut response, base_cookie(SESSION_COOKIE, visitor.session_id));
    }

    response
}

fn read_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|c| c.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')))
        .map(str::to_string)
        .filter(|v| Uuid::parse_str(v).is_ok())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn base_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn append_cookie(response: &mut Response, cookie: Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("Could not encode cookie {}: {}", cookie.name(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_only_well_formed_ids() {
        let id = "0b6f3c1e-8f7a-4a7c-9d55-2a4d7f0c9e11";
        let header = format!("theme=dark; {}={}; other=1", DEVICE_COOKIE, id);
        assert_eq!(read_cookie(&header, DEVICE_COOKIE).as_deref(), Some(id));
        assert_eq!(read_cookie(&header, SESSION_COOKIE), None);
        assert_eq!(read_cookie("device_id=not-a-uuid", DEVICE_COOKIE), None);
        assert_eq!(read_cookie(&format!("device_idx={id}"), DEVICE_COOKIE), None);
    }
}
