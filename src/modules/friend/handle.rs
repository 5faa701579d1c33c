use actix_web::{delete, get, post, web};

use crate::{
    api::{error, success},
    modules::friend::{
        model::{BlockBody, FriendRequestBody, FriendResponse, PageQuery},
        schema::FriendRequestEntity,
        service::FriendService,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("")]
pub async fn list_friends(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<i64>,
    query: ValidatedQuery<PageQuery>,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let page = query.0.window()?;
    let friends = friend_service.get_friends(user_id.into_inner(), page).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[get("/two-hop")]
pub async fn list_friends_of_friends(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<i64>,
    query: ValidatedQuery<PageQuery>,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let page = query.0.window()?;
    let friends = friend_service.get_friends_of_friends(user_id.into_inner(), page).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends of friends retrieved successfully"))
}

#[delete("/{friend_id}")]
pub async fn remove_friend(
    friend_service: web::Data<FriendService>,
    path: web::Path<(i64, i64)>,
) -> Result<success::Success<()>, error::Error> {
    let (user_id, friend_id) = path.into_inner();
    friend_service.remove_friend(user_id, friend_id).await?;
    Ok(success::Success::no_content())
}

#[post("")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<i64>,
    body: ValidatedJson<FriendRequestBody>,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let user_id = user_id.into_inner();
    if body.0.friend_id == user_id {
        return Err(error::Error::bad_request("Cannot send friend request to yourself"));
    }
    let request = friend_service.send_friend_request(user_id, body.0.friend_id).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[get("/received")]
pub async fn list_received_requests(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<i64>,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let requesters = friend_service.get_requesters(user_id.into_inner()).await?;

    Ok(success::Success::ok(Some(requesters)).message("Friend requesters retrieved successfully"))
}

#[get("/sent")]
pub async fn list_sent_requests(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<i64>,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let requested = friend_service.get_requested(user_id.into_inner()).await?;

    Ok(success::Success::ok(Some(requested)).message("Requested users retrieved successfully"))
}

#[get("/sent/{friend_id}")]
pub async fn get_sent_request(
    friend_service: web::Data<FriendService>,
    path: web::Path<(i64, i64)>,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let (user_id, friend_id) = path.into_inner();
    let request = friend_service.get_friend_request(user_id, friend_id).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request retrieved successfully"))
}

#[post("/{friend_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendService>,
    path: web::Path<(i64, i64)>,
) -> Result<success::Success<FriendResponse>, error::Error> {
    let (user_id, friend_id) = path.into_inner();
    let friend = friend_service.accept_friend_request(user_id, friend_id).await?;

    Ok(success::Success::ok(Some(friend)).message("Friend request accepted"))
}

#[post("/{friend_id}/decline")]
pub async fn decline_friend_request(
    friend_service: web::Data<FriendService>,
    path: web::Path<(i64, i64)>,
) -> Result<success::Success<()>, error::Error> {
    let (user_id, friend_id) = path.into_inner();
    friend_service.decline_friend_request(user_id, friend_id).await?;

    Ok(success::Success::ok(None).message("Friend request declined"))
}

#[post("")]
pub async fn block_user(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<i64>,
    body: ValidatedJson<BlockBody>,
) -> Result<success::Success<()>, error::Error> {
    let user_id = user_id.into_inner();
    if body.0.block_id == user_id {
        return Err(error::Error::bad_request("Cannot block yourself"));
    }
    friend_service.block_user(user_id, body.0.block_id).await?;

    Ok(success::Success::created(None).message("User blocked"))
}

#[get("")]
pub async fn list_blocked(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<i64>,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let blocked = friend_service.get_blocked(user_id.into_inner()).await?;

    Ok(success::Success::ok(Some(blocked)).message("Block list retrieved successfully"))
}

#[delete("/{block_id}")]
pub async fn unblock_user(
    friend_service: web::Data<FriendService>,
    path: web::Path<(i64, i64)>,
) -> Result<success::Success<()>, error::Error> {
    let (user_id, block_id) = path.into_inner();
    friend_service.unblock_user(user_id, block_id).await?;
    Ok(success::Success::no_content())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};

    use crate::modules::{self, friend::service::FriendService, memory_store::MemoryStore};
    use crate::{modules::user::service::UserService, utils};

    macro_rules! test_app {
        () => {{
            let store = MemoryStore::new();
            let user_service = UserService::with_dependencies(Arc::new(store.clone()));
            let friend_service =
                FriendService::with_dependencies(Arc::new(store.clone()), Arc::new(store));

            test::init_service(
                App::new()
                    .app_data(utils::path_config())
                    .app_data(web::Data::new(user_service))
                    .app_data(web::Data::new(friend_service))
                    .service(web::scope("/api").configure(modules::configure)),
            )
            .await
        }};
    }

    /// Sends the request and returns the status with the JSON body (`Null` when empty).
    macro_rules! call {
        ($app:expr, $req:expr) => {{
            let resp = test::call_service(&$app, $req.to_request()).await;
            let status: StatusCode = resp.status();
            let bytes = test::read_body(resp).await;
            let body: Value =
                if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
            (status, body)
        }};
    }

    macro_rules! create_user {
        ($app:expr, $name:expr) => {{
            let (_, body) = call!(
                $app,
                test::TestRequest::post().uri("/api/users").set_json(json!({ "name": $name }))
            );
            body["data"]["id"].as_i64().unwrap()
        }};
    }

    fn names(body: &Value) -> Vec<&str> {
        body["data"].as_array().unwrap().iter().map(|f| f["name"].as_str().unwrap()).collect()
    }

    #[actix_web::test]
    async fn request_accept_and_list_friends() {
        let app = test_app!();
        let alice = create_user!(app, "alice");
        let bob = create_user!(app, "bob");

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/users/{alice}/friend-requests"))
                .set_json(json!({ "friendId": bob }))
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "pending");

        let (_, body) = call!(
            app,
            test::TestRequest::get().uri(&format!("/api/users/{bob}/friend-requests/received"))
        );
        assert_eq!(names(&body), vec!["alice"]);

        let (status, body) = call!(
            app,
            test::TestRequest::post().uri(&format!("/api/users/{bob}/friend-requests/{alice}/accept"))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Friend request accepted");
        assert_eq!(body["data"]["name"], "alice");

        let (_, body) = call!(app, test::TestRequest::get().uri(&format!("/api/users/{alice}/friends")));
        assert_eq!(names(&body), vec!["bob"]);
        let (_, body) = call!(app, test::TestRequest::get().uri(&format!("/api/users/{bob}/friends")));
        assert_eq!(names(&body), vec!["alice"]);

        let (_, body) = call!(
            app,
            test::TestRequest::get().uri(&format!("/api/users/{alice}/friend-requests/sent/{bob}"))
        );
        assert_eq!(body["data"]["status"], "accepted");

        let (status, _) = call!(
            app,
            test::TestRequest::post().uri(&format!("/api/users/{bob}/friend-requests/{alice}/decline"))
        );
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) =
            call!(app, test::TestRequest::delete().uri(&format!("/api/users/{bob}/friends/{alice}")));
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = call!(app, test::TestRequest::get().uri(&format!("/api/users/{alice}/friends")));
        assert!(names(&body).is_empty());
    }

    #[actix_web::test]
    async fn two_hop_with_block_and_paging() {
        let app = test_app!();
        let alice = create_user!(app, "Alice");
        let bob = create_user!(app, "Bob");
        let charlie = create_user!(app, "Charlie");
        let david = create_user!(app, "David");

        for other in [alice, charlie, david] {
            let (status, _) = call!(
                app,
                test::TestRequest::post()
                    .uri(&format!("/api/users/{bob}/friend-requests"))
                    .set_json(json!({ "friendId": other }))
            );
            assert_eq!(status, StatusCode::CREATED);
            let (status, _) = call!(
                app,
                test::TestRequest::post().uri(&format!("/api/users/{other}/friend-requests/{bob}/accept"))
            );
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _) = call!(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/users/{alice}/blocks"))
                .set_json(json!({ "blockId": charlie }))
        );
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) =
            call!(app, test::TestRequest::get().uri(&format!("/api/users/{alice}/friends/two-hop")));
        assert_eq!(names(&body), vec!["David"]);

        let (_, body) = call!(
            app,
            test::TestRequest::get().uri(&format!("/api/users/{charlie}/friends/two-hop?limit=1&page=2"))
        );
        assert_eq!(names(&body), vec!["David"]);

        let (_, body) = call!(app, test::TestRequest::get().uri(&format!("/api/users/{alice}/blocks")));
        assert_eq!(names(&body), vec!["Charlie"]);

        let (status, _) =
            call!(app, test::TestRequest::delete().uri(&format!("/api/users/{alice}/blocks/{charlie}")));
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) =
            call!(app, test::TestRequest::get().uri(&format!("/api/users/{alice}/friends/two-hop")));
        assert_eq!(names(&body), vec!["Charlie", "David"]);
    }

    #[actix_web::test]
    async fn gateway_rejects_bad_input() {
        let app = test_app!();
        let alice = create_user!(app, "alice");

        for uri in [
            format!("/api/users/{alice}/friends?limit=0&page=1"),
            format!("/api/users/{alice}/friends?limit=5&page=0"),
            format!("/api/users/{alice}/friends?page=2"),
            format!("/api/users/{alice}/friends/two-hop?limit=abc"),
            "/api/users/abc/friends".to_string(),
        ] {
            let (status, _) = call!(app, test::TestRequest::get().uri(&uri));
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/users/{alice}/friend-requests"))
                .set_json(json!({ "friendId": alice }))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Cannot send friend request to yourself");

        let (status, _) =
            call!(app, test::TestRequest::post().uri("/api/users").set_json(json!({ "name": "" })));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn missing_request_maps_to_not_found() {
        let app = test_app!();
        let alice = create_user!(app, "alice");
        let bob = create_user!(app, "bob");

        let (status, body) = call!(
            app,
            test::TestRequest::post().uri(&format!("/api/users/{alice}/friend-requests/{bob}/accept"))
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Friend request not found");
    }

    #[actix_web::test]
    async fn user_lifecycle() {
        let app = test_app!();
        let alice = create_user!(app, "alice");

        let (status, body) = call!(app, test::TestRequest::get().uri(&format!("/api/users/{alice}")));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "id": alice, "name": "alice" }));

        let (status, _) = call!(app, test::TestRequest::delete().uri(&format!("/api/users/{alice}")));
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call!(app, test::TestRequest::get().uri(&format!("/api/users/{alice}")));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
