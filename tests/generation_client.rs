//! Generation client against a mock generation service

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use flowchart_studio::config::ApiConfig;
use flowchart_studio::export::json as flowchart_json;
use flowchart_studio::{
    Command, ExportFormat, FlowchartError, GenerationClient, GenerationService, ImageUpload,
    Notice, Studio, StudioConfig,
};

/// Everything the mock service received
#[derive(Default)]
struct Received {
    bodies: Mutex<Vec<(&'static str, Value)>>,
    uploads: Mutex<Vec<Upload>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Upload {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

fn four_step_graph() -> Value {
    let labels = ["Start", "Process", "Decision", "End"];
    let nodes: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            json!({
                "id": format!("node_{i}"),
                "type": "default",
                "data": { "label": label },
                "position": { "x": 250, "y": i * 100 },
                "style": {
                    "background": "#ffffff",
                    "border": "2px solid #3b82f6",
                    "borderRadius": "8px"
                }
            })
        })
        .collect();
    let edges: Vec<Value> = (1..labels.len())
        .map(|i| {
            json!({
                "id": format!("edge_{}", i - 1),
                "source": format!("node_{}", i - 1),
                "target": format!("node_{i}"),
                "animated": true
            })
        })
        .collect();
    json!({ "nodes": nodes, "edges": edges, "metadata": { "source": "text", "node_count": 4 } })
}

async fn text(State(received): State<Arc<Received>>, Json(body): Json<Value>) -> Json<Value> {
    received.bodies.lock().unwrap().push(("/generate/text", body));
    Json(four_step_graph())
}

async fn prompt(State(received): State<Arc<Received>>, Json(body): Json<Value>) -> Json<Value> {
    received.bodies.lock().unwrap().push(("/generate/prompt", body));
    Json(four_step_graph())
}

async fn image(State(received): State<Arc<Received>>, mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap().to_vec();
        received.uploads.lock().unwrap().push(Upload {
            field: name,
            file_name,
            content_type,
            bytes,
        });
    }
    Json(four_step_graph())
}

/// Serve `router` on an ephemeral port and return its base URL
fn serve(router: Router) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn mock_service() -> (String, Arc<Received>) {
    let received = Arc::new(Received::default());
    let router = Router::new()
        .route("/generate/text", post(text))
        .route("/generate/prompt", post(prompt))
        .route("/generate/image", post(image))
        .with_state(received.clone());
    (serve(router), received)
}

fn client_for(base_url: &str) -> GenerationClient {
    GenerationClient::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: Some(10),
    })
    .unwrap()
}

#[test]
fn test_text_posts_exact_string() {
    let (url, received) = mock_service();
    let client = client_for(&url);

    let graph = client
        .generate_from_text("Start -> Process -> Decision -> End")
        .unwrap();

    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 3);
    assert_eq!(
        *received.bodies.lock().unwrap(),
        vec![(
            "/generate/text",
            json!({ "text": "Start -> Process -> Decision -> End" })
        )]
    );
}

#[test]
fn test_prompt_body() {
    let (url, received) = mock_service();
    client_for(&url)
        .generate_from_prompt("Create a user login process flowchart")
        .unwrap();

    assert_eq!(
        *received.bodies.lock().unwrap(),
        vec![(
            "/generate/prompt",
            json!({ "prompt": "Create a user login process flowchart" })
        )]
    );
}

#[test]
fn test_image_is_sent_as_file_field() {
    let (url, received) = mock_service();
    let upload = ImageUpload::new("whiteboard.png", b"\x89PNG\r\n\x1a\nfake".to_vec());

    let graph = client_for(&url).generate_from_image(&upload).unwrap();

    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(
        *received.uploads.lock().unwrap(),
        vec![Upload {
            field: "file".to_string(),
            file_name: Some("whiteboard.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: b"\x89PNG\r\n\x1a\nfake".to_vec(),
        }]
    );
}

#[test]
fn test_error_status_carries_detail() {
    let router = Router::new().route(
        "/generate/text",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Error generating flowchart: model unavailable" })),
            )
        }),
    );
    let url = serve(router);

    let err = client_for(&url).generate_from_text("A -> B").unwrap_err();
    match err {
        FlowchartError::Request(message) => assert_eq!(
            message,
            "Request failed with status code 500: Error generating flowchart: model unavailable"
        ),
        other => panic!("expected request error, got {other:?}"),
    }
}

#[test]
fn test_dangling_edge_is_schema_error() {
    let router = Router::new().route(
        "/generate/prompt",
        post(|| async {
            Json(json!({
                "nodes": [{
                    "id": "node_0",
                    "data": { "label": "Only" },
                    "position": { "x": 0, "y": 0 }
                }],
                "edges": [{ "id": "edge_0", "source": "node_0", "target": "node_9" }]
            }))
        }),
    );
    let url = serve(router);

    let err = client_for(&url).generate_from_prompt("anything").unwrap_err();
    assert!(matches!(err, FlowchartError::Schema(_)), "{err:?}");
}

#[test]
fn test_non_graph_body_is_schema_error() {
    let router = Router::new().route(
        "/generate/text",
        post(|| async { Json(json!({ "flowchart": "A -> B" })) }),
    );
    let url = serve(router);

    let err = client_for(&url).generate_from_text("A -> B").unwrap_err();
    assert!(matches!(err, FlowchartError::Schema(_)), "{err:?}");
}

#[test]
fn test_unreachable_service_is_request_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let err = client_for(&format!("http://127.0.0.1:{port}"))
        .generate_from_text("A -> B")
        .unwrap_err();
    assert!(matches!(err, FlowchartError::Request(_)), "{err:?}");
}

#[test]
fn test_studio_generates_and_exports_against_service() {
    let (url, received) = mock_service();
    let out = tempfile::tempdir().unwrap();

    let mut config = StudioConfig::default();
    config.api.base_url = url;
    config.export.output_dir = out.path().to_path_buf();
    let mut studio = Studio::from_config(&config).unwrap();

    studio
        .input_mut()
        .set_text("Start -> Process -> Decision -> End");
    studio.submit(Command::Generate);
    studio.process();
    studio.wait();
    studio.process();
    assert_eq!(received.bodies.lock().unwrap().len(), 1);

    studio.submit(Command::Export(ExportFormat::Json));
    let notices = studio.process();
    let path = out.path().join("flowchart.json");
    assert_eq!(notices, vec![Notice::Exported(path.clone())]);

    let imported = flowchart_json::decode(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(imported.nodes, studio.store().graph().nodes);
    assert_eq!(imported.edges, studio.store().graph().edges);
}
