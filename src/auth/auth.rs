use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Admin identity placed in request extensions by the admin middleware.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
    pub token_id: String,
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AdminUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Admin session required")),
        )
    }
}
