//! Fomento server library
//!
//! actix-web application exposing the REST API over the opportunity pipeline.

pub mod api;
pub mod middleware;
pub mod model;
pub mod startup;

/// Guard a handler behind authentication.
///
/// Expands to the current [`fomento_auth::UserAccount`]; returns a 403 (or 500
/// on a lookup failure) from the surrounding handler otherwise. The handler
/// must take the raw `HttpRequest` and the `AppState` data.
#[macro_export]
macro_rules! secured {
    ($req:expr, $data:expr) => {{
        let auth_context = actix_web::HttpMessage::extensions(&$req)
            .get::<fomento_auth::AuthContext>()
            .cloned()
            .unwrap_or_default();

        if !auth_context.is_authenticated() {
            let message = match &auth_context.jwt_error {
                Some(err) => format!("Code: 401, Message: {}", err),
                None => format!("Code: 401, Message: {}", fomento_auth::USER_NOT_FOUND_MESSAGE),
            };
            return actix_web::HttpResponse::Forbidden().json(
                $crate::model::response::ErrorResult::forbidden(&message, $req.path()),
            );
        }

        match fomento_auth::service::user::find_account_by_email(
            $data.db(),
            &auth_context.username,
        )
        .await
        {
            Ok(Some(account)) => account,
            Ok(None) => {
                return actix_web::HttpResponse::Forbidden().json(
                    $crate::model::response::ErrorResult::forbidden(
                        fomento_auth::USER_NOT_FOUND_MESSAGE,
                        $req.path(),
                    ),
                );
            }
            Err(e) => {
                tracing::error!("Failed to load account '{}': {}", auth_context.username, e);
                return actix_web::HttpResponse::InternalServerError().json(
                    $crate::model::response::Result::<String>::fail(e.to_string()),
                );
            }
        }
    }};
}
