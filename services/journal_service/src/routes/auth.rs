use actix_multipart::Multipart;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Cookie;
use actix_web::{web, HttpResponse};

use super::error_response;
use super::form::FormData;
use crate::operations::authenticate::{authenticate, AuthenticateInput};
use crate::operations::register::{register as register_account, RegisterInput};
use crate::session::SESSION_COOKIE;
use crate::Context;

pub(crate) async fn register(
    ctx: web::Data<Context>,
    payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    let mut form = FormData::read(payload, ctx.max_payload_bytes).await?;
    let input = RegisterInput::builder()
        .username(form.field("username"))
        .email(form.field("email"))
        .full_name(form.field("fullName"))
        .password(form.field("password"))
        .confirm_password(form.field("confirmPassword"))
        .role(form.field("role"))
        .avatar(form.take_file("avatar"))
        .build();

    Ok(match register_account(&ctx.accounts(), &ctx.file_store, input).await {
        Ok(output) => HttpResponse::Created().json(output),
        Err(e) => error_response(&e),
    })
}

pub(crate) async fn login(ctx: web::Data<Context>, input: web::Json<AuthenticateInput>) -> HttpResponse {
    let output = match authenticate(
        &ctx.accounts(),
        &ctx.token_secret,
        ctx.session_ttl,
        ctx.remember_session_ttl,
        input.into_inner(),
    )
    .await
    {
        Ok(output) => output,
        Err(e) => return error_response(&e),
    };

    let ttl = if output.remember {
        ctx.remember_session_ttl
    } else {
        ctx.session_ttl
    };
    let cookie = Cookie::build(SESSION_COOKIE, output.token.clone())
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::seconds(ttl.num_seconds()))
        .finish();

    HttpResponse::Ok().cookie(cookie).json(output)
}

pub(crate) async fn logout() -> HttpResponse {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({ "loggedOut": true }))
}
