use super::testing::{multipart_body, photo, Fixture};
use crate::db::model::{face_encoding::uniform, user::new_user, User, UserLog};
use actix_web::{http::StatusCode, test};

fn stored_file(fixture: &Fixture, image_path: &str) -> std::path::PathBuf {
    fixture
        .image_dir
        .join(image_path.strip_prefix("images/").unwrap())
}

fn register_request(fixture: &Fixture, fields: &[(&str, &str)], image: &[u8]) -> test::TestRequest {
    let (content_type, body) = multipart_body(fields, Some(("image_file", image)));
    test::TestRequest::post()
        .uri("/users/")
        .insert_header(fixture.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn index_welcomes() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![]))).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let message: facegate_web_core::Message = test::read_body_json(resp).await;
    assert!(!message.message.is_empty());
}

#[actix_web::test]
async fn token_is_issued_for_valid_credentials() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![]))).await;

    let login = |username: &str, password: &str| {
        test::TestRequest::post()
            .uri("/admin/token")
            .set_form(&facegate_web_core::LoginForm {
                username: username.to_string(),
                password: password.to_string(),
            })
            .to_request()
    };

    let resp = test::call_service(&app, login("root", "toor")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let token: facegate_web_core::Token = test::read_body_json(resp).await;
    assert_eq!(token.token_type, "bearer");
    assert_eq!(fixture.tokens.validate(&token.access_token).unwrap().sub, "root");

    let resp = test::call_service(&app, login("root", "wrong")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, login("nobody", "toor")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, login("root", "")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_routes_need_a_valid_token() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![]))).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/users/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let error: facegate_web_core::ErrorDesc = test::read_body_json(resp).await;
    assert_eq!(error.description, "Not authenticated");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/users_log/")
            .insert_header(("Authorization", "Bearer forged"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let stranger = crate::auth::TokenService::new(b"test-secret", chrono::Duration::minutes(5))
        .issue("deleted-admin")
        .unwrap();
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/me")
            .insert_header(("Authorization", format!("Bearer {}", stranger)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admins_register_other_admins() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![]))).await;

    let register = |name: &str| {
        test::TestRequest::post()
            .uri("/admin/register")
            .insert_header(fixture.bearer())
            .set_json(facegate_web_core::NewAdmin {
                name: name.to_string(),
                password: "hunter2".to_string(),
            })
            .to_request()
    };

    let resp = test::call_service(&app, register("ops")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let admin: facegate_web_core::Admin = test::read_body_json(resp).await;
    assert_eq!(admin.name, "ops");

    let resp = test::call_service(&app, register("ops")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/me")
            .insert_header(fixture.bearer())
            .to_request(),
    )
    .await;
    let me: facegate_web_core::Admin = test::read_body_json(resp).await;
    assert_eq!(me.name, "root");
}

#[actix_web::test]
async fn registering_a_user_stores_photo_and_encoding() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.3)]))).await;

    let resp = test::call_service(
        &app,
        register_request(
            &fixture,
            &[
                ("name", "Ana Maria"),
                ("cellphone", "5511999990000"),
                ("email", "ana@example.com"),
                ("position", ""),
            ],
            &photo(),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.name, "Ana Maria");
    assert_eq!(user.email.as_deref(), Some("ana@example.com"));
    assert_eq!(user.position, None);
    assert_eq!(user.image_path, format!("images/ana_maria_{}.jpg", user.id));
    assert!(stored_file(&fixture, &user.image_path).is_file());

    let stored = User::fetch(&fixture.db.system, user.id).await.unwrap().unwrap();
    assert_eq!(stored.encoding, uniform(0.3));
    assert_eq!(stored.image_path, user.image_path);
}

#[actix_web::test]
async fn stored_photos_are_served_from_their_image_path() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.3)]))).await;

    let resp = test::call_service(
        &app,
        register_request(&fixture, &[("name", "Ana"), ("cellphone", "1")], &photo()).to_request(),
    )
    .await;
    let user: facegate_web_core::User = test::read_body_json(resp).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/{}", user.image_path))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let served = test::read_body(resp).await;
    assert_eq!(
        image::guess_format(&served).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[actix_web::test]
async fn oversized_registrations_are_rejected() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.3)]))).await;

    let padding = "x".repeat(crate::MAX_IMAGE_SIZE / 2);
    let resp = test::call_service(
        &app,
        register_request(
            &fixture,
            &[
                ("name", "Ana"),
                ("cellphone", "1"),
                ("note", padding.as_str()),
                ("other_note", padding.as_str()),
                ("last_note", padding.as_str()),
            ],
            &photo(),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert!(User::fetch_all(&fixture.db.system).await.unwrap().is_empty());
}

#[actix_web::test]
async fn failed_registrations_leave_nothing_behind() {
    use diesel::RunQueryDsl;

    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.3)]))).await;

    fixture
        .db
        .system
        .run_query(|db_connection| {
            diesel::sql_query(
                "CREATE TRIGGER freeze_image_paths BEFORE UPDATE OF image_path ON users \
                 BEGIN SELECT RAISE(ABORT, 'image_path is read only'); END",
            )
            .execute(db_connection)
        })
        .await
        .unwrap();

    let resp = test::call_service(
        &app,
        register_request(&fixture, &[("name", "Ana"), ("cellphone", "1")], &photo()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert!(User::fetch_all(&fixture.db.system).await.unwrap().is_empty());
    assert_eq!(std::fs::read_dir(&fixture.image_dir).unwrap().count(), 0);
}

#[actix_web::test]
async fn registration_needs_exactly_one_face() {
    let fixture = Fixture::new().await;

    for faces in [vec![], vec![uniform(0.1), uniform(0.9)]] {
        let app = test::init_service(crate::app(fixture.state(faces))).await;

        let resp = test::call_service(
            &app,
            register_request(&fixture, &[("name", "Ana"), ("cellphone", "1")], &photo())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    assert!(User::fetch_all(&fixture.db.system).await.unwrap().is_empty());
}

#[actix_web::test]
async fn registration_rejects_bad_input() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.1)]))).await;

    let photo = photo();
    let cases: [(&[(&str, &str)], &[u8]); 4] = [
        (&[("name", "Ana"), ("cellphone", "1")], b"not an image"),
        (&[("name", "Ana"), ("cellphone", "+55 11")], &photo),
        (&[("name", "R2D2"), ("cellphone", "1")], &photo),
        (&[("cellphone", "1")], &photo),
    ];

    for (fields, image) in cases {
        let resp =
            test::call_service(&app, register_request(&fixture, fields, image).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{:?}", fields);
    }

    let (content_type, body) = multipart_body(&[("name", "Ana"), ("cellphone", "1")], None);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/users")
            .insert_header(fixture.bearer())
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn cellphones_are_unique() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.1)]))).await;

    let first = test::call_service(
        &app,
        register_request(&fixture, &[("name", "Ana"), ("cellphone", "123")], &photo())
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = test::call_service(
        &app,
        register_request(&fixture, &[("name", "Bia"), ("cellphone", "123")], &photo())
            .to_request(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let bia = User::insert(&fixture.db.system, new_user("bia", "456", 0.5))
        .await
        .unwrap();
    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}/cellphone", bia))
            .insert_header(fixture.bearer())
            .set_form(&facegate_web_core::CellphoneUpdate {
                cellphone: Some("123".into()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn users_are_listed_fetched_and_updated() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![]))).await;

    let ana = User::insert(&fixture.db.system, new_user("ana", "1", 0.0))
        .await
        .unwrap();
    User::insert(&fixture.db.system, new_user("bia", "2", 0.5))
        .await
        .unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/users/")
            .insert_header(fixture.bearer())
            .to_request(),
    )
    .await;
    let users: Vec<facegate_web_core::User> = test::read_body_json(resp).await;
    assert_eq!(
        users.iter().map(|user| user.name.as_str()).collect::<Vec<_>>(),
        vec!["ana", "bia"]
    );

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}", ana))
            .insert_header(fixture.bearer())
            .set_form(&facegate_web_core::NameUpdate {
                name: Some("Ana Clara".into()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.name, "Ana Clara");

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}", ana))
            .insert_header(fixture.bearer())
            .set_form(&facegate_web_core::NameUpdate { name: None })
            .to_request(),
    )
    .await;
    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.name, "Ana Clara");

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}/cellphone", ana))
            .insert_header(fixture.bearer())
            .set_form(&facegate_web_core::CellphoneUpdate {
                cellphone: Some("5511988887777".into()),
            })
            .to_request(),
    )
    .await;
    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.cellphone, "5511988887777");

    for uri in ["/users/999", "/users/999/cellphone"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(uri)
                .insert_header(fixture.bearer())
                .set_form(&facegate_web_core::NameUpdate {
                    name: Some("Zoe".into()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/users/999")
            .insert_header(fixture.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn replacing_the_photo_replaces_the_encoding() {
    let fixture = Fixture::new().await;

    let ana = User::insert(&fixture.db.system, new_user("ana", "1", 0.0))
        .await
        .unwrap();

    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.7)]))).await;

    let (content_type, body) = multipart_body(&[], Some(("image_file", &photo())));
    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}/image", ana))
            .insert_header(fixture.bearer())
            .insert_header(("Content-Type", content_type.clone()))
            .set_payload(body.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.image_path, format!("images/ana_{}.jpg", ana));
    assert!(stored_file(&fixture, &user.image_path).is_file());

    let stored = User::fetch(&fixture.db.system, ana).await.unwrap().unwrap();
    assert_eq!(stored.encoding, uniform(0.7));

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}", ana))
            .insert_header(fixture.bearer())
            .set_form(&facegate_web_core::NameUpdate {
                name: Some("Bia".into()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}/image", ana))
            .insert_header(fixture.bearer())
            .insert_header(("Content-Type", content_type.clone()))
            .set_payload(body.clone())
            .to_request(),
    )
    .await;
    let renamed: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(renamed.image_path, format!("images/bia_{}.jpg", ana));
    assert!(stored_file(&fixture, &renamed.image_path).is_file());
    assert!(!stored_file(&fixture, &user.image_path).exists());

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri("/users/999/image")
            .insert_header(fixture.bearer())
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_a_user_removes_logs_and_photo() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.2)]))).await;

    let resp = test::call_service(
        &app,
        register_request(&fixture, &[("name", "Ana"), ("cellphone", "1")], &photo()).to_request(),
    )
    .await;
    let user: facegate_web_core::User = test::read_body_json(resp).await;

    UserLog::insert(&fixture.db.system, user.id, chrono::Utc::now().naive_utc())
        .await
        .unwrap();

    let delete = || {
        test::TestRequest::delete()
            .uri(&format!("/users/{}", user.id))
            .insert_header(fixture.bearer())
            .to_request()
    };

    let file_path = stored_file(&fixture, &user.image_path);
    assert!(file_path.is_file());

    let resp = test::call_service(&app, delete()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(!file_path.exists());
    assert!(UserLog::fetch_page(&fixture.db.system, 0, 100)
        .await
        .unwrap()
        .is_empty());

    let resp = test::call_service(&app, delete()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn recognition_logs_matches() {
    let fixture = Fixture::new().await;

    let ana = User::insert(&fixture.db.system, new_user("ana", "1", 0.0))
        .await
        .unwrap();
    User::insert(&fixture.db.system, new_user("bia", "2", 1.0))
        .await
        .unwrap();

    let app = test::init_service(crate::app(fixture.state(vec![uniform(0.01), uniform(0.5)]))).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/recognition/recognize")
            .insert_header(("Content-Type", "image/png"))
            .set_payload(photo())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let recognition: facegate_web_core::Recognition = test::read_body_json(resp).await;
    assert!(recognition.status);
    assert_eq!(recognition.recognized_people.len(), 1);
    assert_eq!(recognition.recognized_people[0].id, ana);
    assert_eq!(recognition.recognized_people[0].cellphone, "1");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/users_log/?skip=0&limit=10")
            .insert_header(fixture.bearer())
            .to_request(),
    )
    .await;
    let logs: Vec<facegate_web_core::UserLog> = test::read_body_json(resp).await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_id, ana);
    assert_eq!(logs[0].user_name, "ana");
    assert_eq!(logs[0].log_time, recognition.recognized_people[0].log_time);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/recognition/recognize")
            .set_payload("garbage")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn updates_accept_any_form_encoding() {
    let fixture = Fixture::new().await;
    let app = test::init_service(crate::app(fixture.state(vec![]))).await;

    let ana = User::insert(&fixture.db.system, new_user("ana", "1", 0.0))
        .await
        .unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}", ana))
            .insert_header(fixture.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.name, "ana");

    let (content_type, body) = multipart_body(&[("name", "Ana Clara")], None);
    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}", ana))
            .insert_header(fixture.bearer())
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.name, "Ana Clara");

    let (content_type, body) = multipart_body(&[("cellphone", "5511988887777")], None);
    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}/cellphone", ana))
            .insert_header(fixture.bearer())
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;
    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.cellphone, "5511988887777");

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}/cellphone", ana))
            .insert_header(fixture.bearer())
            .to_request(),
    )
    .await;
    let user: facegate_web_core::User = test::read_body_json(resp).await;
    assert_eq!(user.cellphone, "5511988887777");

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{}", ana))
            .insert_header(fixture.bearer())
            .insert_header(("Content-Type", "text/plain"))
            .set_payload("name=Zoe")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[::core::prelude::v1::test]
fn image_paths_resolve_inside_the_image_directory() {
    let image_dir = super::ImageDirPath::from(std::path::PathBuf::from("/srv/images"));

    assert_eq!(super::ImageDirPath::public_path("ana_1.jpg"), "images/ana_1.jpg");
    assert_eq!(
        image_dir.resolve("images/ana_1.jpg"),
        Some(std::path::PathBuf::from("/srv/images/ana_1.jpg"))
    );
    assert_eq!(image_dir.resolve("images/../secrets"), None);
    assert_eq!(image_dir.resolve("images/nested/ana_1.jpg"), None);
    assert_eq!(image_dir.resolve("/tmp/ana_1.jpg"), None);
    assert_eq!(image_dir.resolve("ana.jpg"), None);
}
