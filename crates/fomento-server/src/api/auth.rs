//! Registration and login endpoints

use actix_web::{Either, HttpResponse, Responder, Scope, post, web};
use serde::{Deserialize, Serialize};

use fomento_auth::service::{auth as auth_service, user as user_service};
use fomento_auth::{AUTHORIZATION_HEADER, TOKEN_PREFIX, USER_NOT_FOUND_MESSAGE, UserAccount};
use fomento_common::error::{self, FomentoError};

use crate::model::AppState;
use crate::model::response::Result;

#[derive(Debug, Deserialize)]
struct RegisterData {
    email: String,
    password: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResult {
    access_token: String,
    token_ttl: i64,
    username: String,
}

#[post("/register")]
async fn register(data: web::Data<AppState>, body: web::Json<RegisterData>) -> impl Responder {
    match user_service::create(data.db(), &body.email, &body.password, &body.name).await {
        Ok(account) => Result::<UserAccount>::http_success(account),
        Err(e) => match e.downcast_ref::<FomentoError>() {
            Some(FomentoError::EmailAlreadyRegistered(_)) => Result::<()>::http_response(
                409,
                error::EMAIL_ALREADY_REGISTERED.code,
                e.to_string(),
                (),
            ),
            Some(FomentoError::IllegalArgument(_)) => Result::<()>::http_response(
                400,
                error::PARAMETER_VALIDATE_ERROR.code,
                e.to_string(),
                (),
            ),
            _ => {
                tracing::error!("Failed to register account: {}", e);
                Result::<()>::http_internal_error(e.to_string())
            }
        },
    }
}

/// Login accepts a JSON body or an HTML form
#[post("/login")]
async fn login(
    data: web::Data<AppState>,
    body: Either<web::Json<LoginData>, web::Form<LoginData>>,
) -> impl Responder {
    let login_data = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let email = login_data.email.unwrap_or_default();
    let password = login_data.password.unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return HttpResponse::Forbidden().body(USER_NOT_FOUND_MESSAGE);
    }

    let user_option = match user_service::find_by_email(data.db(), &email).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to query account '{}': {}", email, e);
            return Result::<()>::http_internal_error("Failed to query account".to_string());
        }
    };

    let user = match user_option {
        Some(u) if u.is_active => u,
        _ => return HttpResponse::Forbidden().body(USER_NOT_FOUND_MESSAGE),
    };

    if !user_service::verify_password(&password, &user.hashed_password) {
        return HttpResponse::Forbidden().body(USER_NOT_FOUND_MESSAGE);
    }

    let token_secret_key = data.configuration.token_secret_key();
    let token_expire_seconds = data.configuration.auth_token_expire_seconds();

    let access_token =
        match auth_service::encode_jwt_token(&user.email, &token_secret_key, token_expire_seconds)
        {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Failed to generate token for '{}': {}", email, e);
                return Result::<()>::http_internal_error("Failed to generate token".to_string());
            }
        };

    HttpResponse::Ok()
        .append_header((
            AUTHORIZATION_HEADER,
            format!("{}{}", TOKEN_PREFIX, access_token),
        ))
        .json(LoginResult {
            access_token,
            token_ttl: token_expire_seconds,
            username: user.email,
        })
}

pub fn routes() -> Scope {
    web::scope("/auth").service(register).service(login)
}
