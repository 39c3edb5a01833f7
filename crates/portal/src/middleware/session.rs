use axum::{
    Extension,
    body::Body,
    http::{Request, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use shared::{config::SessionConfig, service::SessionService};
use tracing::debug;
use uuid::Uuid;

/// Opaque id of the caller's session, taken from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.cookie_secure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn issue(&self, session_id: &SessionId) -> Cookie<'static> {
        Cookie::build((self.name.clone(), session_id.0.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    /// Empty cookie that expires immediately, so the browser drops it.
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();
        cookie.make_removal();
        cookie
    }

    fn already_set(&self, response: &Response) -> bool {
        let prefix = format!("{}=", self.name);
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with(&prefix))
    }
}

/// Resolves the session id (issuing one on first visit) and attaches it and a
/// snapshot of the session to the request.
pub async fn session_middleware(
    Extension(sessions): Extension<SessionService>,
    Extension(cookie): Extension<SessionCookie>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let existing = jar
        .get(cookie.name())
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());

    let (session_id, jar) = match existing {
        Some(id) => (SessionId(id), jar),
        None => {
            let id = SessionId::generate();
            debug!("Issuing new session cookie");
            let jar = jar.add(cookie.issue(&id));
            (id, jar)
        }
    };

    let session = sessions.snapshot(session_id.as_str()).await;
    req.extensions_mut().insert(session_id);
    req.extensions_mut().insert(session);

    let response = next.run(req).await;

    if cookie.already_set(&response) {
        response
    } else {
        (jar, response).into_response()
    }
}
