use owncloud_client::models::UserAttributeKey;
use owncloud_client::{ClientError, ResponseFormat};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod helpers;
use helpers::{ocs_json, ocs_xml, test_client, test_client_with_format};

fn ok_json(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/json")
        .set_body_string(ocs_json(100, "", data))
}

#[tokio::test]
async fn test_create_existing_user_raises_ocs_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocs/v1.php/cloud/users"))
        .and(body_string_contains("userid=bob"))
        .and(body_string_contains("password=pw1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(ocs_json(102, "user already exists", json!([]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.users().create_user("bob", "pw1").await.unwrap_err();

    match err {
        ClientError::Ocs(ocs) => {
            assert_eq!(ocs.status_code_str(), "102");
            assert_eq!(ocs.message, "user already exists");
        }
        other => panic!("expected an OCS error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_and_delete_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocs/v1.php/cloud/users"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/ocs/v1.php/cloud/users/john%20doe"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.users().create_user("carol", "s3cret").await.unwrap());
    assert!(client.users().delete_user("john doe").await.unwrap());
}

#[tokio::test]
async fn test_empty_username_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(matches!(
        client.users().create_user("", "pw").await,
        Err(ClientError::Validation { .. })
    ));
    assert!(matches!(
        client.groups().create_group("  ").await,
        Err(ClientError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_sub_admin_groups_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users/alice/subadmins"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ocs_xml(
            102,
            "Unknown error occured",
            "",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users/bob/subadmins"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ocs_xml(
            100,
            "",
            "<element>staff</element><element>interns</element>",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users/mallory/subadmins"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ocs_xml(101, "User does not exist", "")))
        .mount(&server)
        .await;

    let client = test_client_with_format(&server, ResponseFormat::Xml);
    assert!(client.users().get_user_sub_admin_groups("alice").await.unwrap().is_empty());
    assert_eq!(
        client.users().get_user_sub_admin_groups("bob").await.unwrap(),
        vec!["staff".to_string(), "interns".to_string()]
    );
    assert!(client.users().is_user_in_sub_admin_group("bob", "interns").await.unwrap());

    let err = client.users().get_user_sub_admin_groups("mallory").await.unwrap_err();
    assert_eq!(err.ocs_status_code(), Some(101));
}

#[tokio::test]
async fn test_search_users_and_user_exists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users"))
        .and(query_param("search", "ali"))
        .respond_with(ok_json(json!({"users": ["alice", "alina"]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users"))
        .and(query_param("search", "alice"))
        .respond_with(ok_json(json!({"users": ["alice"]})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.users().search_users("ali").await.unwrap().len(), 2);
    assert!(client.users().user_exists("alice").await.unwrap());
}

#[tokio::test]
async fn test_user_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users/alice"))
        .respond_with(ok_json(json!({
            "email": "alice@example.com",
            "displayname": "Alice",
            "enabled": true,
            "quota": {"free": 1000, "used": 24, "total": 1024, "relative": 2.34}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/ocs/v1.php/cloud/users/alice"))
        .and(body_string_contains("key=email"))
        .and(body_string_contains("value=a%40example.org"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let user = client.users().get_user_attributes("alice").await.unwrap();
    assert_eq!(user.display_name, "Alice");
    assert!(user.enabled);
    assert_eq!(user.quota.total, 1024.0);

    assert!(client
        .users()
        .set_user_attribute("alice", UserAttributeKey::Email, "a@example.org")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_enable_and_disable_user() {
    let server = MockServer::start().await;
    for action in ["enable", "disable"] {
        Mock::given(method("PUT"))
            .and(path(format!("/ocs/v1.php/cloud/users/alice/{}", action)))
            .respond_with(ok_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = test_client(&server);
    assert!(client.users().disable_user("alice").await.unwrap());
    assert!(client.users().enable_user("alice").await.unwrap());
}

#[tokio::test]
async fn test_group_membership() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocs/v1.php/cloud/users/alice/groups"))
        .and(body_string_contains("groupid=staff"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users/alice/groups"))
        .respond_with(ok_json(json!({"groups": ["staff", "admin"]})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/ocs/v1.php/cloud/users/alice/groups"))
        .and(query_param("groupid", "staff"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ocs/v1.php/cloud/users/alice/subadmins"))
        .and(body_string_contains("groupid=staff"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/ocs/v1.php/cloud/users/alice/subadmins"))
        .and(query_param("groupid", "staff"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let users = client.users();
    assert!(users.add_user_to_group("alice", "staff").await.unwrap());
    assert!(users.is_user_in_group("alice", "admin").await.unwrap());
    assert!(!users.is_user_in_group("alice", "guests").await.unwrap());
    assert!(users.remove_user_from_group("alice", "staff").await.unwrap());
    assert!(users.add_user_to_sub_admin_group("alice", "staff").await.unwrap());
    assert!(users.remove_user_from_sub_admin_group("alice", "staff").await.unwrap());
}

#[tokio::test]
async fn test_groups() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocs/v1.php/cloud/groups"))
        .and(body_string_contains("groupid=designers"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/groups"))
        .and(query_param("search", "designers"))
        .respond_with(ok_json(json!({"groups": ["designers"]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/groups/designers"))
        .respond_with(ok_json(json!({"users": ["alice", "bob"]})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/ocs/v1.php/cloud/groups/designers"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let groups = client.groups();
    assert!(groups.create_group("designers").await.unwrap());
    assert!(groups.group_exists("designers").await.unwrap());
    assert_eq!(groups.get_group_members("designers").await.unwrap(), vec!["alice", "bob"]);
    assert!(groups.delete_group("designers").await.unwrap());
}

#[tokio::test]
async fn test_get_config_xml() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/config"))
        .and(query_param("format", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ocs_xml(
            100,
            "",
            "<version>1.7</version><website>ownCloud</website><host>cloud.example.com</host>\
             <contact></contact><ssl>false</ssl>",
        )))
        .mount(&server)
        .await;

    let client = test_client_with_format(&server, ResponseFormat::Xml);
    let config = client.apps().get_config().await.unwrap();
    assert_eq!(config.version, "1.7");
    assert_eq!(config.host, "cloud.example.com");
    assert_eq!(config.contact, "");
}

#[tokio::test]
async fn test_app_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/privatedata/getattribute/notes/theme"))
        .respond_with(ok_json(json!([{"app": "notes", "key": "theme", "value": "dark"}])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ocs/v1.php/privatedata/setattribute/notes/theme"))
        .and(body_string_contains("value=light"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ocs/v1.php/privatedata/deleteattribute/notes/theme"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let attributes = client.attributes().get_attribute(Some("notes"), Some("theme")).await.unwrap();
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes[0].value, "dark");

    assert!(client.attributes().set_attribute("notes", "theme", "light").await.unwrap());
    assert!(client.attributes().delete_attribute("notes", "theme").await.unwrap());
}

#[tokio::test]
async fn test_all_attributes_without_app() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/privatedata/getattribute"))
        .respond_with(ok_json(json!([
            {"app": "notes", "key": "theme", "value": "dark"},
            {"app": "calendar", "key": "week_start", "value": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let attributes = client.attributes().get_attribute(None, None).await.unwrap();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes[1].app, "calendar");
    assert_eq!(attributes[1].value, "1");

    let keyed = client.attributes().get_attribute(None, Some("theme")).await;
    assert!(matches!(keyed, Err(ClientError::Validation { .. })));
}

#[tokio::test]
async fn test_apps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/apps"))
        .respond_with(ok_json(json!({"apps": ["files", "files_sharing", "activity"]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/apps/files"))
        .respond_with(ok_json(json!({
            "id": "files",
            "name": "Files",
            "licence": "AGPL",
            "requiremin": "4.9",
            "shipped": "true",
            "standalone": "",
            "types": ["filesystem"],
            "remote": {"files": "appinfo/remote.php", "webdav": "appinfo/remote.php"},
            "documentation": {"user": "user-files"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ocs/v1.php/cloud/apps/activity"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/ocs/v1.php/cloud/apps/activity"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.apps().get_apps().await.unwrap().len(), 3);

    let files = client.apps().get_app("files").await.unwrap();
    assert_eq!(files.name, "Files");
    assert!(files.shipped);
    assert!(!files.standalone);
    assert_eq!(files.types, vec!["filesystem".to_string()]);
    assert_eq!(files.remote.get("webdav").map(String::as_str), Some("appinfo/remote.php"));

    assert!(client.apps().enable_app("activity").await.unwrap());
    assert!(client.apps().disable_app("activity").await.unwrap());
}

#[tokio::test]
async fn test_malformed_user_payload_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users/x"))
        .respond_with(ok_json(json!("garbage")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ocs/v1.php/cloud/users/x/groups"))
        .respond_with(ok_json(json!({"teams": ["staff"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let user = client.users().get_user_attributes("x").await;
    assert!(matches!(user, Err(ClientError::Parse { .. })), "got {:?}", user);

    let groups = client.users().get_user_groups("x").await;
    assert!(matches!(groups, Err(ClientError::Parse { .. })), "got {:?}", groups);
}
