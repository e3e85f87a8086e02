mod common;

use axum::http::{header, StatusCode};
use chrono::{Duration, Utc};
use clubhub::domain::UserRole;
use serde_json::{json, Value};

use common::{register, send, test_app, test_context};

fn club_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "A friendly group that meets every Thursday.",
        "category": "technical",
        "tags": ["  coding ", "coding", ""],
    })
}

fn event_body(club_id: &str, max_participants: i32) -> Value {
    let start = Utc::now() + Duration::days(5);
    json!({
        "title": "Hack Night",
        "description": "Bring a project and build something together.",
        "club": club_id,
        "eventType": "workshop",
        "startDate": start.to_rfc3339(),
        "endDate": (start + Duration::hours(3)).to_rfc3339(),
        "location": "Library",
        "venue": "Room 2",
        "maxParticipants": max_participants,
        "isRegistrationRequired": true,
    })
}

#[tokio::test]
async fn test_health_and_api_info() {
    let app = test_app(test_context().await);

    let health = send(&app, "GET", "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "OK");
    assert!(health.body["timestamp"].is_string());

    let info = send(&app, "GET", "/api", None, None).await;
    assert_eq!(info.status, StatusCode::OK);
    assert_eq!(info.body["name"], "ClubHub API");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = test_app(test_context().await);

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "  Ada Lovelace ",
            "email": "ADA@Example.com",
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "User registered successfully");
    assert_eq!(response.body["user"]["name"], "Ada Lovelace");
    assert_eq!(response.body["user"]["email"], "ada@example.com");
    assert_eq!(response.body["user"]["role"], "student");
    assert!(response.body["user"].get("password").is_none());
    assert!(response.body["user"].get("passwordHash").is_none());
    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    // Same address again
    let duplicate = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["error"], "User already exists");

    let login = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["message"], "Login successful");
    let token = login.body["token"].as_str().unwrap().to_string();

    let me = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "ada@example.com");

    let wrong = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "nope-nope" })),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let anonymous = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forged = send(&app, "GET", "/api/auth/me", Some("not.a.jwt"), None).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

    let logout = send(&app, "POST", "/api/auth/logout", None, None).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = test_app(test_context().await);

    let invalid = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "A", "email": "not-an-email", "password": "123" })),
    )
    .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["error"], "Validation failed");
    let fields: Vec<&str> = invalid.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "name", "password"]);

    let admin = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Mallory",
            "email": "mallory@example.com",
            "password": "secret123",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(admin.status, StatusCode::BAD_REQUEST);

    let malformed = send(&app, "POST", "/api/auth/login", None, Some(json!("just a string"))).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_club_lifecycle() {
    let app = test_app(test_context().await);
    let (president, _) = register(&app, "Pat President", "pat@example.com").await;
    let (student, student_id) = register(&app, "Sam Student", "sam@example.com").await;

    let unauthenticated = send(&app, "POST", "/api/clubs", None, Some(club_body("Coders"))).await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);

    let created = send(&app, "POST", "/api/clubs", Some(&president), Some(club_body("Coders"))).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["message"], "Club created successfully");
    assert_eq!(created.body["club"]["tags"], json!(["coding"]));
    let club_id = created.body["club"]["id"].as_str().unwrap().to_string();

    let joined = send(&app, "POST", &format!("/api/clubs/{}/join", club_id), Some(&student), None).await;
    assert_eq!(joined.status, StatusCode::OK);
    assert_eq!(joined.body["message"], "Successfully joined the club");

    let again = send(&app, "POST", &format!("/api/clubs/{}/join", club_id), Some(&student), None).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["error"], "Already a member of this club");

    let details = send(&app, "GET", &format!("/api/clubs/{}", club_id), None, None).await;
    assert_eq!(details.status, StatusCode::OK);
    assert_eq!(details.body["president"]["name"], "Pat President");
    assert_eq!(details.body["members"].as_array().unwrap().len(), 2);

    // Only the president (or an admin) may edit
    let forbidden = send(
        &app,
        "PUT",
        &format!("/api/clubs/{}", club_id),
        Some(&student),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let promoted = send(
        &app,
        "PUT",
        &format!("/api/clubs/{}", club_id),
        Some(&president),
        Some(json!({ "vicePresident": student_id })),
    )
    .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["club"]["vicePresidentId"], json!(student_id));

    let mine = send(&app, "GET", "/api/users/clubs", Some(&student), None).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body.as_array().unwrap().len(), 1);

    let left = send(&app, "POST", &format!("/api/clubs/{}/leave", club_id), Some(&student), None).await;
    assert_eq!(left.status, StatusCode::OK);
    let after_leave = send(&app, "GET", &format!("/api/clubs/{}", club_id), None, None).await;
    assert!(after_leave.body["vicePresidentId"].is_null());
    assert!(after_leave.body["vicePresident"].is_null());
    assert_eq!(after_leave.body["members"].as_array().unwrap().len(), 1);

    let president_leaves =
        send(&app, "POST", &format!("/api/clubs/{}/leave", club_id), Some(&president), None).await;
    assert_eq!(president_leaves.status, StatusCode::BAD_REQUEST);
    assert_eq!(president_leaves.body["error"], "The club president cannot leave the club");

    let not_member = send(&app, "POST", &format!("/api/clubs/{}/leave", club_id), Some(&student), None).await;
    assert_eq!(not_member.status, StatusCode::BAD_REQUEST);
    assert_eq!(not_member.body["error"], "Not a member of this club");

    let deleted = send(&app, "DELETE", &format!("/api/clubs/{}", club_id), Some(&president), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    let gone = send(&app, "GET", &format!("/api/clubs/{}", club_id), None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["error"], "Club not found");
}

#[tokio::test]
async fn test_club_list_pagination_and_filters() {
    let app = test_app(test_context().await);
    let (token, _) = register(&app, "Pat President", "pat@example.com").await;

    for name in ["Alpha Coders", "Beta Coders", "Gamma Coders"] {
        let created = send(&app, "POST", "/api/clubs", Some(&token), Some(club_body(name))).await;
        assert_eq!(created.status, StatusCode::CREATED);
    }

    let first = send(&app, "GET", "/api/clubs?limit=2", None, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["clubs"].as_array().unwrap().len(), 2);
    assert_eq!(first.body["total"], 3);
    assert_eq!(first.body["totalPages"], 2);
    assert_eq!(first.body["currentPage"], 1);
    assert_eq!(first.body["clubs"][0]["memberCount"], 1);

    let second = send(&app, "GET", "/api/clubs?limit=2&page=2", None, None).await;
    assert_eq!(second.body["clubs"].as_array().unwrap().len(), 1);
    assert_eq!(second.body["currentPage"], 2);

    let searched = send(&app, "GET", "/api/clubs?search=beta", None, None).await;
    assert_eq!(searched.body["total"], 1);
    assert_eq!(searched.body["clubs"][0]["name"], "Beta Coders");

    let other = send(&app, "GET", "/api/clubs?category=sports", None, None).await;
    assert_eq!(other.body["total"], 0);
    assert_eq!(other.body["totalPages"], 0);
}

#[tokio::test]
async fn test_event_rules() {
    let app = test_app(test_context().await);
    let (president, _) = register(&app, "Pat President", "pat@example.com").await;
    let (first, _) = register(&app, "Ann", "ann@example.com").await;
    let (second, _) = register(&app, "Ben", "ben@example.com").await;

    let club = send(&app, "POST", "/api/clubs", Some(&president), Some(club_body("Coders"))).await;
    let club_id = club.body["club"]["id"].as_str().unwrap().to_string();

    // Non-members cannot organise events
    let outsider = send(&app, "POST", "/api/events", Some(&first), Some(event_body(&club_id, 1))).await;
    assert_eq!(outsider.status, StatusCode::FORBIDDEN);

    let mut backwards = event_body(&club_id, 1);
    backwards["endDate"] = json!((Utc::now() + Duration::days(1)).to_rfc3339());
    let invalid = send(&app, "POST", "/api/events", Some(&president), Some(backwards)).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["errors"][0]["field"], "endDate");

    let created = send(&app, "POST", "/api/events", Some(&president), Some(event_body(&club_id, 1))).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let event_id = created.body["event"]["id"].as_str().unwrap().to_string();

    let registered = send(&app, "POST", &format!("/api/events/{}/register", event_id), Some(&first), None).await;
    assert_eq!(registered.status, StatusCode::OK);
    assert_eq!(registered.body["message"], "Successfully registered for the event");

    let twice = send(&app, "POST", &format!("/api/events/{}/register", event_id), Some(&first), None).await;
    assert_eq!(twice.status, StatusCode::BAD_REQUEST);
    assert_eq!(twice.body["error"], "Already registered for this event");

    let full = send(&app, "POST", &format!("/api/events/{}/register", event_id), Some(&second), None).await;
    assert_eq!(full.status, StatusCode::BAD_REQUEST);
    assert_eq!(full.body["error"], "Event is full");

    // Lifting the cap reopens registration
    let shrink = send(
        &app,
        "PUT",
        &format!("/api/events/{}", event_id),
        Some(&president),
        Some(json!({ "maxParticipants": 0, "isRegistrationRequired": true })),
    )
    .await;
    assert_eq!(shrink.status, StatusCode::OK);

    let now_open = send(&app, "POST", &format!("/api/events/{}/register", event_id), Some(&second), None).await;
    assert_eq!(now_open.status, StatusCode::OK);

    let details = send(&app, "GET", &format!("/api/events/{}", event_id), None, None).await;
    assert_eq!(details.body["registeredParticipants"].as_array().unwrap().len(), 2);
    assert_eq!(details.body["club"]["name"], "Coders");

    let mine = send(&app, "GET", "/api/users/events", Some(&first), None).await;
    assert_eq!(mine.body["total"], 1);

    let upcoming = send(&app, "GET", "/api/events?upcoming=true&eventType=workshop", None, None).await;
    assert_eq!(upcoming.body["total"], 1);
    assert_eq!(upcoming.body["events"][0]["registeredCount"], 2);

    let unregistered = send(&app, "POST", &format!("/api/events/{}/unregister", event_id), Some(&first), None).await;
    assert_eq!(unregistered.status, StatusCode::OK);
    let not_registered = send(&app, "POST", &format!("/api/events/{}/unregister", event_id), Some(&first), None).await;
    assert_eq!(not_registered.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_announcement_targeting_and_visibility() {
    let ctx = test_context().await;
    let app = test_app(ctx.clone());
    let (president, _) = register(&app, "Pat President", "pat@example.com").await;
    let (member, _) = register(&app, "Mia Member", "mia@example.com").await;
    let (outsider, outsider_id) = register(&app, "Otto Outsider", "otto@example.com").await;

    let club = send(&app, "POST", "/api/clubs", Some(&president), Some(club_body("Coders"))).await;
    let club_id = club.body["club"]["id"].as_str().unwrap().to_string();
    send(&app, "POST", &format!("/api/clubs/{}/join", club_id), Some(&member), None).await;

    let missing_target = send(
        &app,
        "POST",
        "/api/announcements",
        Some(&president),
        Some(json!({
            "title": "Room change",
            "content": "We are moving to a bigger room next week.",
            "targetAudience": "specific_club",
        })),
    )
    .await;
    assert_eq!(missing_target.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        missing_target.body["error"],
        "Target club is required for specific club announcements"
    );

    let public = send(
        &app,
        "POST",
        "/api/announcements",
        Some(&president),
        Some(json!({
            "title": "Open day",
            "content": "Everyone is welcome at the open day on Friday.",
            "priority": "low",
            "targetAudience": "all",
        })),
    )
    .await;
    assert_eq!(public.status, StatusCode::CREATED);

    let members_only = send(
        &app,
        "POST",
        "/api/announcements",
        Some(&president),
        Some(json!({
            "title": "Dues reminder",
            "content": "Members, please settle your dues before the end of the month.",
            "club": club_id,
            "priority": "urgent",
            "targetAudience": "club_members",
        })),
    )
    .await;
    assert_eq!(members_only.status, StatusCode::CREATED);
    let private_id = members_only.body["announcement"]["id"].as_str().unwrap().to_string();

    let direct = send(
        &app,
        "POST",
        "/api/announcements",
        Some(&president),
        Some(json!({
            "title": "Just for you",
            "content": "Could you help set up the projector on Friday?",
            "targetAudience": "specific_users",
            "targetUsers": [outsider_id],
        })),
    )
    .await;
    assert_eq!(direct.status, StatusCode::CREATED);

    let anonymous = send(&app, "GET", "/api/announcements", None, None).await;
    assert_eq!(anonymous.body["total"], 1);
    assert_eq!(anonymous.body["announcements"][0]["title"], "Open day");

    // Urgent first for members
    let as_member = send(&app, "GET", "/api/announcements", Some(&member), None).await;
    assert_eq!(as_member.body["total"], 2);
    assert_eq!(as_member.body["announcements"][0]["title"], "Dues reminder");

    let as_outsider = send(&app, "GET", "/api/announcements", Some(&outsider), None).await;
    let titles: Vec<&str> = as_outsider.body["announcements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Just for you"));
    assert!(!titles.contains(&"Dues reminder"));

    let hidden = send(&app, "GET", &format!("/api/announcements/{}", private_id), Some(&outsider), None).await;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);

    let visible = send(&app, "GET", &format!("/api/announcements/{}", private_id), Some(&member), None).await;
    assert_eq!(visible.status, StatusCode::OK);
    assert_eq!(visible.body["club"]["name"], "Coders");
    assert_eq!(visible.body["author"]["name"], "Pat President");

    // Only the author or an admin can edit
    let edit = send(
        &app,
        "PUT",
        &format!("/api/announcements/{}", private_id),
        Some(&member),
        Some(json!({ "title": "Changed" })),
    )
    .await;
    assert_eq!(edit.status, StatusCode::FORBIDDEN);

    let admin = common::insert_user(&ctx.db_pool, "Root Admin", "root@example.com", UserRole::Admin).await;
    let admin_token = ctx.auth_service.issue_token(&admin).unwrap();
    let as_admin = send(&app, "GET", "/api/announcements", Some(&admin_token), None).await;
    assert_eq!(as_admin.body["total"], 3);

    let deactivated = send(
        &app,
        "PUT",
        &format!("/api/announcements/{}", private_id),
        Some(&admin_token),
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(deactivated.status, StatusCode::OK);
    let inactive = send(&app, "GET", &format!("/api/announcements/{}", private_id), Some(&member), None).await;
    assert_eq!(inactive.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_profile_and_search() {
    let app = test_app(test_context().await);
    let (token, _) = register(&app, "Grace Hopper", "grace@example.com").await;
    register(&app, "Alan Turing", "alan@example.com").await;

    let blank = send(&app, "GET", "/api/users/search?q=%20", None, None).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["error"], "Search query is required");

    let found = send(&app, "GET", "/api/users/search?q=turing", None, None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["total"], 1);
    assert_eq!(found.body["users"][0]["name"], "Alan Turing");

    let updated = send(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({
            "bio": "Compiler pioneer",
            "interests": ["compilers", " navy "],
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["user"]["bio"], "Compiler pioneer");
    assert_eq!(updated.body["user"]["interests"], json!(["compilers", "navy"]));
    assert_eq!(updated.body["user"]["role"], "student");

    let pictured = send(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({ "profilePicture": "https://img.example.com/grace.png" })),
    )
    .await;
    assert_eq!(pictured.body["user"]["profilePicture"], "https://img.example.com/grace.png");
    assert_eq!(pictured.body["user"]["bio"], "Compiler pioneer");

    let cleared = send(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({ "profilePicture": null })),
    )
    .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.body["user"]["profilePicture"].is_null());

    let profile = send(&app, "GET", "/api/users/profile", Some(&token), None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["joinedClubs"], json!([]));
}

#[tokio::test]
async fn test_bad_ids_and_filters_report_json_errors() {
    let app = test_app(test_context().await);
    let (token, _) = register(&app, "Pat President", "pat@example.com").await;

    for uri in [
        "/api/clubs/not-a-uuid",
        "/api/events/not-a-uuid",
        "/api/announcements/not-a-uuid",
        "/api/events?club=",
        "/api/events?eventType=bogus",
        "/api/clubs?page=abc",
    ] {
        let response = send(&app, "GET", uri, None, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(response.body["error"].is_string(), "{} -> {}", uri, response.body);
    }

    let join = send(&app, "POST", "/api/clubs/42/join", Some(&token), None).await;
    assert_eq!(join.status, StatusCode::BAD_REQUEST);
    assert!(join.body["error"].is_string());

    let mine = send(&app, "GET", "/api/users/events?status=later", Some(&token), None).await;
    assert_eq!(mine.status, StatusCode::BAD_REQUEST);
    assert!(mine.body["error"].is_string());
}

#[tokio::test]
async fn test_event_management_rules() {
    let app = test_app(test_context().await);
    let (president, _) = register(&app, "Pat President", "pat@example.com").await;
    let (member, _) = register(&app, "Mia Member", "mia@example.com").await;
    let (other, _) = register(&app, "Ola Other", "ola@example.com").await;

    let club = send(&app, "POST", "/api/clubs", Some(&president), Some(club_body("Coders"))).await;
    let club_id = club.body["club"]["id"].as_str().unwrap().to_string();
    send(&app, "POST", &format!("/api/clubs/{}/join", club_id), Some(&member), None).await;
    send(&app, "POST", &format!("/api/clubs/{}/join", club_id), Some(&other), None).await;

    let created = send(&app, "POST", "/api/events", Some(&president), Some(event_body(&club_id, 5))).await;
    let event_id = created.body["event"]["id"].as_str().unwrap().to_string();
    let event_uri = format!("/api/events/{}", event_id);
    let register_uri = format!("/api/events/{}/register", event_id);

    send(&app, "POST", &register_uri, Some(&member), None).await;
    send(&app, "POST", &register_uri, Some(&other), None).await;

    let below = send(&app, "PUT", &event_uri, Some(&president), Some(json!({ "maxParticipants": 1 }))).await;
    assert_eq!(below.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        below.body["error"],
        "Maximum participants cannot be below the current registrations"
    );
    let exact = send(&app, "PUT", &event_uri, Some(&president), Some(json!({ "maxParticipants": 2 }))).await;
    assert_eq!(exact.status, StatusCode::OK);
    assert_eq!(exact.body["event"]["maxParticipants"], 2);

    // Club membership alone does not grant management
    let edit = send(&app, "PUT", &event_uri, Some(&member), Some(json!({ "title": "Taken over" }))).await;
    assert_eq!(edit.status, StatusCode::FORBIDDEN);
    assert_eq!(edit.body["error"], "Not authorized to update this event");
    let remove = send(&app, "DELETE", &event_uri, Some(&member), None).await;
    assert_eq!(remove.status, StatusCode::FORBIDDEN);
    assert_eq!(remove.body["error"], "Not authorized to delete this event");

    let deleted = send(&app, "DELETE", &event_uri, Some(&president), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Event deleted successfully");
    let gone = send(&app, "GET", &event_uri, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["error"], "Event not found");
    let mine = send(&app, "GET", "/api/users/events", Some(&member), None).await;
    assert_eq!(mine.body["total"], 0);
}

#[tokio::test]
async fn test_registration_refusals_over_http() {
    let app = test_app(test_context().await);
    let (president, _) = register(&app, "Pat President", "pat@example.com").await;
    let (student, _) = register(&app, "Sam Student", "sam@example.com").await;

    let club = send(&app, "POST", "/api/clubs", Some(&president), Some(club_body("Coders"))).await;
    let club_id = club.body["club"]["id"].as_str().unwrap().to_string();

    let mut late = event_body(&club_id, 0);
    late["registrationDeadline"] = json!((Utc::now() - Duration::hours(1)).to_rfc3339());
    let late = send(&app, "POST", "/api/events", Some(&president), Some(late)).await;
    assert_eq!(late.status, StatusCode::CREATED);
    let late_id = late.body["event"]["id"].as_str().unwrap().to_string();

    let missed = send(&app, "POST", &format!("/api/events/{}/register", late_id), Some(&student), None).await;
    assert_eq!(missed.status, StatusCode::BAD_REQUEST);
    assert_eq!(missed.body["error"], "Registration deadline has passed");

    let open = send(&app, "POST", "/api/events", Some(&president), Some(event_body(&club_id, 0))).await;
    let open_id = open.body["event"]["id"].as_str().unwrap().to_string();
    let cancelled = send(
        &app,
        "PUT",
        &format!("/api/events/{}", open_id),
        Some(&president),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(cancelled.status, StatusCode::OK);

    let closed = send(&app, "POST", &format!("/api/events/{}/register", open_id), Some(&student), None).await;
    assert_eq!(closed.status, StatusCode::BAD_REQUEST);
    assert_eq!(closed.body["error"], "Event is not open for registration");
}

#[tokio::test]
async fn test_announcement_ownership_and_club_cascade() {
    let app = test_app(test_context().await);
    let (president, _) = register(&app, "Pat President", "pat@example.com").await;
    let (member, member_id) = register(&app, "Mia Member", "mia@example.com").await;

    let club = send(&app, "POST", "/api/clubs", Some(&president), Some(club_body("Coders"))).await;
    let club_id = club.body["club"]["id"].as_str().unwrap().to_string();
    send(&app, "POST", &format!("/api/clubs/{}/join", club_id), Some(&member), None).await;

    let event = send(&app, "POST", "/api/events", Some(&president), Some(event_body(&club_id, 0))).await;
    let event_id = event.body["event"]["id"].as_str().unwrap().to_string();

    let posted = send(
        &app,
        "POST",
        "/api/announcements",
        Some(&president),
        Some(json!({
            "title": "Helpers wanted",
            "content": "We need two volunteers for the club fair stand.",
            "club": club_id,
            "targetAudience": "specific_users",
            "targetUsers": [member_id, member_id],
        })),
    )
    .await;
    assert_eq!(posted.status, StatusCode::CREATED);
    assert_eq!(posted.body["announcement"]["targetUserIds"], json!([member_id]));
    let announcement_uri = format!(
        "/api/announcements/{}",
        posted.body["announcement"]["id"].as_str().unwrap()
    );

    // Repeated ids in an update are collapsed, not treated as unknown users
    let retargeted = send(
        &app,
        "PUT",
        &announcement_uri,
        Some(&president),
        Some(json!({ "targetUsers": [member_id, member_id] })),
    )
    .await;
    assert_eq!(retargeted.status, StatusCode::OK);
    assert_eq!(retargeted.body["announcement"]["targetUserIds"], json!([member_id]));

    let remove = send(&app, "DELETE", &announcement_uri, Some(&member), None).await;
    assert_eq!(remove.status, StatusCode::FORBIDDEN);
    assert_eq!(remove.body["error"], "Not authorized to delete this announcement");

    let deleted_club = send(&app, "DELETE", &format!("/api/clubs/{}", club_id), Some(&president), None).await;
    assert_eq!(deleted_club.status, StatusCode::OK);

    let event_gone = send(&app, "GET", &format!("/api/events/{}", event_id), None, None).await;
    assert_eq!(event_gone.status, StatusCode::NOT_FOUND);
    let announcement_gone = send(&app, "GET", &announcement_uri, Some(&president), None).await;
    assert_eq!(announcement_gone.status, StatusCode::NOT_FOUND);
    let events = send(&app, "GET", "/api/events", None, None).await;
    assert_eq!(events.body["total"], 0);
}

#[tokio::test]
async fn test_announcement_search_matches_tags_not_json() {
    let app = test_app(test_context().await);
    let (token, _) = register(&app, "Pat President", "pat@example.com").await;

    for (title, tags) in [
        ("Freshers week", json!(["orientation", "campus"])),
        ("Library hours", json!(["study"])),
    ] {
        let posted = send(
            &app,
            "POST",
            "/api/announcements",
            Some(&token),
            Some(json!({
                "title": title,
                "content": "Details are posted on the noticeboard by the main entrance.",
                "targetAudience": "all",
                "tags": tags,
            })),
        )
        .await;
        assert_eq!(posted.status, StatusCode::CREATED);
    }

    let by_tag = send(&app, "GET", "/api/announcements?search=orient", None, None).await;
    assert_eq!(by_tag.body["total"], 1);
    assert_eq!(by_tag.body["announcements"][0]["title"], "Freshers week");

    for punctuation in ["%22", "%2C", "%5B"] {
        let uri = format!("/api/announcements?search={}", punctuation);
        let none = send(&app, "GET", &uri, None, None).await;
        assert_eq!(none.body["total"], 0, "{}", uri);
    }
}

#[tokio::test]
async fn test_profile_page_pages_through_registered_events() {
    let app = test_app(test_context().await);
    let (token, _) = register(&app, "Pat President", "pat@example.com").await;

    let club = send(&app, "POST", "/api/clubs", Some(&token), Some(club_body("Coders"))).await;
    let club_id = club.body["club"]["id"].as_str().unwrap().to_string();
    for _ in 0..11 {
        let event = send(&app, "POST", "/api/events", Some(&token), Some(event_body(&club_id, 0))).await;
        let event_id = event.body["event"]["id"].as_str().unwrap().to_string();
        let registered = send(&app, "POST", &format!("/api/events/{}/register", event_id), Some(&token), None).await;
        assert_eq!(registered.status, StatusCode::OK);
    }

    let first = send(&app, "GET", "/profile", Some(&token), None).await;
    assert_eq!(first.status, StatusCode::OK);
    let html = first.body.as_str().unwrap();
    assert!(html.contains("My events (11)"));
    assert!(html.contains("Page 1 of 2"));
    assert!(html.contains("Next &raquo;"));

    let second = send(&app, "GET", "/profile?page=2", Some(&token), None).await;
    let html = second.body.as_str().unwrap();
    assert!(html.contains("Page 2 of 2"));
    assert_eq!(html.matches("<article class=\"event\">").count(), 1);
}
