use crate::modules::friend::handle::*;
use actix_web::web::{ServiceConfig, scope};

/// Registered ahead of the `/users` scope, which would otherwise claim these paths.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/users/{id}/friends")
            .service(list_friends)
            .service(list_friends_of_friends)
            .service(remove_friend),
    )
    .service(
        scope("/users/{id}/friend-requests")
            .service(send_friend_request)
            .service(list_received_requests)
            .service(list_sent_requests)
            .service(get_sent_request)
            .service(accept_friend_request)
            .service(decline_friend_request),
    )
    .service(
        scope("/users/{id}/blocks")
            .service(block_user)
            .service(list_blocked)
            .service(unblock_user),
    );
}
