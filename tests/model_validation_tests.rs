use chrono::Utc;
use opinions_api::{
    AppError,
    error::ErrorBody,
    models::{
        CreateTopicResponse, ExistingTopicResponse, LoginRequest, RegisterUserRequest, Topic,
        TopicRequest, TopicWriteResponse, UpdatePasswordRequest, UpdateProfileRequest, User,
    },
};
use validator::Validate;

// --- Validation Rules ---

fn registration(user_name: &str, email: &str, password: &str) -> RegisterUserRequest {
    RegisterUserRequest {
        user_name: user_name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn test_topic_description_bounds() {
    let at_limit = TopicRequest {
        description: "x".repeat(255),
    };
    assert!(at_limit.validate().is_ok());

    let empty = TopicRequest::default();
    assert!(empty.validate().is_err());
}

#[test]
fn test_registration_rules() {
    assert!(registration("ana", "ana@x.com", "longenough").validate().is_ok());

    // username length 2..=20
    assert!(registration("a", "ana@x.com", "longenough").validate().is_err());
    assert!(registration(&"a".repeat(21), "ana@x.com", "longenough").validate().is_err());
    assert!(registration(&"a".repeat(20), "ana@x.com", "longenough").validate().is_ok());

    assert!(registration("ana", "not-an-email", "longenough").validate().is_err());
    assert!(registration("ana", "ana@x.com", "1234567").validate().is_err());
    assert!(registration("ana", "ana@x.com", "12345678").validate().is_ok());
}

#[test]
fn test_email_longer_than_the_column_is_rejected() {
    // Well-formed, but past the 255 characters the users table holds.
    let long_email = format!(
        "{}@{}.{}.{}.{}.com",
        "a".repeat(64),
        "b".repeat(60),
        "c".repeat(60),
        "d".repeat(60),
        "e".repeat(60)
    );
    assert!(long_email.len() > 255);

    let err: AppError = registration("ana", &long_email, "longenough")
        .validate()
        .unwrap_err()
        .into();
    assert!(matches!(err, AppError::Validation(ref msg) if msg == "email must be at most 255 characters"));

    let profile = UpdateProfileRequest {
        user_name: "ana".to_string(),
        email: long_email,
    };
    assert!(profile.validate().is_err());

    let at_limit = format!(
        "{}@{}.{}.{}.com",
        "a".repeat(64),
        "b".repeat(60),
        "c".repeat(62),
        "d".repeat(62)
    );
    assert_eq!(at_limit.len(), 255);
    assert!(registration("ana", &at_limit, "longenough").validate().is_ok());
}

#[test]
fn test_validation_errors_become_one_sorted_message() {
    let err: AppError = registration("a", "bad", "short").validate().unwrap_err().into();

    match err {
        AppError::Validation(message) => assert_eq!(
            message,
            "email is not a valid address; password must be at least 8 characters; \
             userName must be between 2 and 20 characters"
        ),
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_profile_and_password_updates_are_validated() {
    let profile = UpdateProfileRequest {
        user_name: "ana".to_string(),
        email: "nope".to_string(),
    };
    assert!(profile.validate().is_err());

    let password = UpdatePasswordRequest {
        password: "short".to_string(),
    };
    assert!(password.validate().is_err());
}

// --- Wire Shapes ---

#[test]
fn test_registration_reads_camel_case_and_defaults_missing_fields() {
    let parsed: RegisterUserRequest =
        serde_json::from_str(r#"{"userName":"ana","email":"ana@x.com"}"#).unwrap();

    assert_eq!(parsed.user_name, "ana");
    // Missing password deserializes empty and is then rejected by validation.
    assert_eq!(parsed.password, "");
    assert!(parsed.validate().is_err());
}

#[test]
fn test_login_fields_are_optional() {
    let parsed: LoginRequest = serde_json::from_str("{}").unwrap();
    assert!(parsed.email.is_none());
    assert!(parsed.password.is_none());
}

#[test]
fn test_user_json_is_camel_case_without_password() {
    let user = User {
        id: 1,
        user_name: "ana".to_string(),
        email: "ana@x.com".to_string(),
        created_at: Utc::now(),
    };

    let json = serde_json::to_value(&user).unwrap();

    assert_eq!(json["userName"], "ana");
    assert!(json.get("createdAt").is_some());
    assert!(json.get("user_name").is_none());
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());
}

#[test]
fn test_create_topic_response_is_untagged() {
    let created = CreateTopicResponse::Created(TopicWriteResponse {
        status: "ok".to_string(),
        message: "The topic with the ID: 3 has been created".to_string(),
        topic: 3,
    });
    let json = serde_json::to_value(&created).unwrap();
    assert_eq!(json["topic"], 3);
    assert!(json.get("Created").is_none());

    let existing = CreateTopicResponse::Existing(ExistingTopicResponse {
        status: "ok".to_string(),
        message: "The topic already exists".to_string(),
        topic: Topic {
            id: 3,
            description: "Housing".to_string(),
            created_at: Utc::now(),
        },
    });
    let json = serde_json::to_value(&existing).unwrap();
    assert_eq!(json["topic"]["description"], "Housing");
}

#[test]
fn test_error_body_shape() {
    let body = ErrorBody {
        status: "error".to_string(),
        message: "nope".to_string(),
    };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "error", "message": "nope" }));
}
