use actix_web::{delete, get, post, web};

use crate::api::{error, success};
use crate::modules::user::{model, service::UserService};
use crate::utils::ValidatedJson;

#[post("")]
pub async fn create_user(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::CreateUserModel>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.create(&user_data.0.name).await?;
    Ok(success::Success::created(Some(user)).message("User created successfully"))
}

#[get("/{id}")]
pub async fn get_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<i64>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.get_by_id(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(user)).message("User retrieved successfully"))
}

#[delete("/{id}")]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<i64>,
) -> Result<success::Success<()>, error::Error> {
    user_service.delete(user_id.into_inner()).await?;
    Ok(success::Success::no_content())
}
