//! Integration tests using wiremock to check what marshalled requests look
//! like on the wire.

use chrono::{TimeZone, Utc};
use http::Method;
use indexmap::IndexMap;
use restmarshal::format::{CalendarDateStyle, DateFormat, EncodeOptions};
use restmarshal::metadata::RequestMetadata;
use restmarshal::params::{compact_mapping, normalize_booleans};
use restmarshal::{Binary, CalendarDate, Encoder, Error, JsonEncodable, Result};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("restmarshal=trace")
        .with_test_writer()
        .try_init();
}

/// A request body the way a generated client would model it.
struct CreateBooking {
    id: Uuid,
    guest: String,
    check_in: CalendarDate,
    nights: u32,
    attachment: Option<Binary>,
    created_at: chrono::DateTime<Utc>,
}

impl JsonEncodable for CreateBooking {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        let mut fields: IndexMap<&str, Value> = IndexMap::new();
        fields.insert("id", encoder.encode(&self.id)?);
        fields.insert("guest", encoder.encode(&self.guest)?);
        fields.insert("checkIn", encoder.encode(&self.check_in)?);
        fields.insert("nights", encoder.encode(&self.nights)?);
        fields.insert("attachment", encoder.encode(&self.attachment)?);
        fields.insert("createdAt", encoder.encode(&self.created_at)?);
        encoder.encode(&fields)
    }
}

fn booking() -> CreateBooking {
    CreateBooking {
        id: Uuid::parse_str("a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8").unwrap(),
        guest: "Ada".to_string(),
        check_in: CalendarDate::new(2024, 9, 5),
        nights: 3,
        attachment: Some(Binary::from(&b"pdf"[..])),
        created_at: Utc.with_ymd_and_hms(2024, 8, 1, 10, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_query_parameters_reach_server_in_order() {
    init_tracing();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("tags", "cat"))
        .and(query_param("tags", "dog"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let response = RequestMetadata::new(Method::GET, "/pets")
        .with_query([
            ("tags", Some(json!(["cat", "dog"]))),
            ("name", None),
            ("limit", Some(json!(5))),
        ])
        .into_request(&client, mock_server.uri())
        .unwrap()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.query(), Some("tags=cat&tags=dog&limit=5"));
}

#[tokio::test]
async fn test_headers_are_compacted_and_stringified() {
    init_tracing();
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/pets/9"))
        .and(header("x-request-id", "req-1"))
        .and(header("x-dry-run", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let response = RequestMetadata::new(Method::DELETE, "/pets/9")
        .with_headers([
            ("X-Request-Id", Some(json!("req-1"))),
            ("X-Trace", None),
            ("X-Dry-Run", Some(json!(true))),
        ])
        .unwrap()
        .into_request(&client, mock_server.uri())
        .unwrap()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 204);

    let received = mock_server.received_requests().await.unwrap();
    assert!(received[0].headers.get("x-trace").is_none());
}

#[tokio::test]
async fn test_encoded_body_sent_as_json() {
    init_tracing();
    let mock_server = MockServer::start().await;

    let expected = json!({
        "id": "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8",
        "guest": "Ada",
        "checkIn": "2024-09-05",
        "nights": 3,
        "attachment": "cGRm",
        "createdAt": "2024-08-01T10:00:00.000Z"
    });

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(header("content-type", "application/json"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let response = RequestMetadata::new(Method::POST, "/bookings")
        .with_json_body(&Encoder::new(), &booking())
        .unwrap()
        .into_request(&client, mock_server.uri())
        .unwrap()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn test_encoder_options_change_body() {
    init_tracing();
    let mock_server = MockServer::start().await;

    let encoder = Encoder::with_options(
        EncodeOptions::builder()
            .date_format(DateFormat::HttpDate)
            .calendar_date_style(CalendarDateStyle::Unpadded)
            .build(),
    );

    let mut expected = json!({
        "id": "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8",
        "guest": "Ada",
        "checkIn": "2024-9-5",
        "nights": 3,
        "attachment": null,
        "createdAt": "Thu, 01 Aug 2024 10:00:00 GMT"
    });

    Mock::given(method("PUT"))
        .and(path("/bookings/1"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut body = booking();
    body.attachment = None;

    let client = reqwest::Client::new();
    let response = RequestMetadata::new(Method::PUT, "/bookings/1")
        .with_json_body(&encoder, &body)
        .unwrap()
        .into_request(&client, mock_server.uri())
        .unwrap()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);

    // The same value with default options renders differently.
    expected["checkIn"] = json!("2024-09-05");
    assert_eq!(
        Encoder::new().encode(&body.check_in).unwrap(),
        expected["checkIn"]
    );
}

#[tokio::test]
async fn test_normalized_form_parameters() {
    init_tracing();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("exact", "false"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = normalize_booleans(compact_mapping([
        ("exact", Some(json!(false))),
        ("page", Some(json!(2))),
        ("cursor", None),
    ]))
    .unwrap();

    assert_eq!(params["exact"], json!("false"));
    assert_eq!(params["page"], json!(2));

    let client = reqwest::Client::new();
    let response = RequestMetadata::new(Method::GET, "/search")
        .with_query(params.into_iter().map(|(k, v)| (k, Some(v))))
        .into_request(&client, mock_server.uri())
        .unwrap()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
}

#[test]
fn test_invalid_body_is_rejected_before_sending() {
    let result = RequestMetadata::new(Method::POST, "/metrics")
        .with_json_body(&Encoder::new(), &vec![1.0, f64::INFINITY]);

    match result {
        Err(Error::NonFiniteNumber(n)) => assert!(n.is_infinite()),
        other => panic!("Expected NonFiniteNumber, got {:?}", other.map(|m| m.body)),
    }
}

#[test]
fn test_calendar_date_round_trips_through_json_models() {
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Pet {
        name: String,
        birthday: CalendarDate,
    }

    let pet: Pet = serde_json::from_str(r#"{"name":"Rex","birthday":"2019-4-1"}"#).unwrap();
    assert_eq!(pet.birthday, CalendarDate::new(2019, 4, 1));

    let json = serde_json::to_value(&pet).unwrap();
    assert_eq!(json["birthday"], json!("2019-04-01"));
}
