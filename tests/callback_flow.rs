use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use payments_ecpay::config::EcpayConfig;
use payments_ecpay::domain::payment::{PaymentRecord, PaymentStatus};
use payments_ecpay::provider::checkmac::{check_mac_value, CHECK_MAC_FIELD};
use payments_ecpay::provider::ecpay::{self, EcpayProvider};
use payments_ecpay::repo::payments_repo::PaymentsRepo;
use payments_ecpay::AppState;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const HASH_KEY: &str = "5294y06JbISpM5x9";
const HASH_IV: &str = "v77hoKGq4kWxNNIS";

fn test_state() -> AppState {
    let cfg = EcpayConfig {
        merchant_id: "2000132".to_string(),
        merchant_name: "Shop Name".to_string(),
        hash_key: HASH_KEY.to_string(),
        hash_iv: HASH_IV.to_string(),
        checkout_url: "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5".to_string(),
        bind_addr: "0.0.0.0:0".to_string(),
        public_base_url: "http://localhost:3000".to_string(),
    };
    AppState {
        checkout_url: cfg.checkout_url.clone(),
        public_base_url: cfg.public_base_url.clone(),
        provider: Arc::new(EcpayProvider::new(cfg).expect("sandbox config is valid")),
        payments_repo: PaymentsRepo::new(),
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/payments", post(payments_ecpay::http::handlers::payments::create_payment))
        .route(
            "/payments/:payment_id",
            get(payments_ecpay::http::handlers::payments::get_payment),
        )
        .route(
            "/payments/:payment_id/checkout",
            get(payments_ecpay::http::handlers::payments::checkout),
        )
        .route(
            "/payments/:payment_id/process",
            post(payments_ecpay::http::handlers::payments::process_callback),
        )
        .with_state(state)
}

fn waiting_payment(id: Uuid) -> PaymentRecord {
    PaymentRecord {
        id,
        variant: ecpay::VARIANT.to_string(),
        currency: "NTD".to_string(),
        total: 1000,
        description: "Order #1".to_string(),
        status: PaymentStatus::Waiting,
        message: None,
        transaction_id: None,
        process_url: format!("http://localhost:3000/payments/{id}/process"),
        success_url: format!("http://localhost:3000/payments/{id}/success"),
        failure_url: format!("http://localhost:3000/payments/{id}/failure"),
    }
}

fn atm_callback_fields() -> BTreeMap<String, String> {
    let mut fields: BTreeMap<String, String> = [
        ("BankCode", "005"),
        ("ExpireDate", "2018/02/04"),
        ("MerchantID", "2000132"),
        ("MerchantTradeNo", "398126F08AC383BC524F"),
        ("PaymentType", "ATM_LAND"),
        ("RtnCode", "2"),
        ("RtnMsg", "Get VirtualAccount Succeeded"),
        ("TradeAmt", "1000"),
        ("TradeDate", "2018/02/01 22:53:26"),
        ("TradeNo", "1802012253184197"),
        ("vAccount", "5219803543954460"),
        ("StoreID", ""),
        ("CustomField1", ""),
        ("CustomField2", ""),
        ("CustomField3", ""),
        ("CustomField4", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    fields.insert(
        CHECK_MAC_FIELD.to_string(),
        check_mac_value(&fields, HASH_KEY, HASH_IV),
    );
    fields
}

fn form_request(payment_id: Uuid, fields: &BTreeMap<String, String>) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).expect("form fields encode");
    Request::builder()
        .method("POST")
        .uri(format!("/payments/{payment_id}/process"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request builds")
}

#[tokio::test]
async fn valid_callback_is_acknowledged_and_applied() {
    let state = test_state();
    let id = Uuid::new_v4();
    state.payments_repo.insert(waiting_payment(id)).unwrap();

    let response = app(state.clone())
        .oneshot(form_request(id, &atm_callback_fields()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"1|OK");

    let record = state.payments_repo.get(id).unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Input);
    assert_eq!(record.message.as_deref(), Some("Get VirtualAccount Succeeded"));
    assert_eq!(record.transaction_id.as_deref(), Some("1802012253184197"));
}

#[tokio::test]
async fn tampered_callback_is_forbidden_and_state_untouched() {
    let state = test_state();
    let id = Uuid::new_v4();
    state.payments_repo.insert(waiting_payment(id)).unwrap();

    let mut fields = atm_callback_fields();
    fields.insert("TradeAmt".to_string(), "10000".to_string());

    let response = app(state.clone())
        .oneshot(form_request(id, &fields))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let record = state.payments_repo.get(id).unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Waiting);
    assert!(record.message.is_none());
    assert!(record.transaction_id.is_none());
}

#[tokio::test]
async fn callback_without_mac_is_forbidden() {
    let state = test_state();
    let id = Uuid::new_v4();
    state.payments_repo.insert(waiting_payment(id)).unwrap();

    let mut fields = atm_callback_fields();
    fields.remove(CHECK_MAC_FIELD);

    let response = app(state).oneshot(form_request(id, &fields)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_body_fails_closed() {
    let state = test_state();
    let id = Uuid::new_v4();
    state.payments_repo.insert(waiting_payment(id)).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/payments/{id}/process"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("RtnCode=%zz&broken"))
        .unwrap();

    let response = app(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let record = state.payments_repo.get(id).unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Waiting);
}

#[tokio::test]
async fn callback_for_unknown_payment_is_not_found() {
    let state = test_state();
    let response = app(state)
        .oneshot(form_request(Uuid::new_v4(), &atm_callback_fields()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn success_callback_confirms_payment() {
    let state = test_state();
    let id = Uuid::new_v4();
    state.payments_repo.insert(waiting_payment(id)).unwrap();

    let mut fields = atm_callback_fields();
    fields.insert("RtnCode".to_string(), "1".to_string());
    fields.insert("RtnMsg".to_string(), "交易成功".to_string());
    fields.insert(
        CHECK_MAC_FIELD.to_string(),
        check_mac_value(&fields, HASH_KEY, HASH_IV),
    );

    let response = app(state.clone())
        .oneshot(form_request(id, &fields))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record = state.payments_repo.get(id).unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Confirmed);
    assert_eq!(record.message.as_deref(), Some("交易成功"));
}
