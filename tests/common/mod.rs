#![allow(dead_code)]

use migration_flow::flow::FlowRecord;
use migration_flow::geo::{ContainerSize, GeometryProvider, Topology};
use migration_flow::render::RasterOverlay;
use migration_flow::{ControllerProps, FlowConfig, InteractionController, QueuedScheduler};
use tracing_subscriber::EnvFilter;

pub const SEOUL: &str = "11";
pub const BUSAN: &str = "26";
pub const INCHEON: &str = "28";

pub const TOPOLOGY: &str = r#"{
    "type": "Topology",
    "arcs": [
        [[126.8, 37.4], [127.1, 37.4], [127.1, 37.7], [126.8, 37.7], [126.8, 37.4]],
        [[128.9, 35.0], [129.2, 35.0], [129.2, 35.3], [128.9, 35.3], [128.9, 35.0]],
        [[126.3, 37.3], [126.6, 37.3], [126.6, 37.6], [126.3, 37.6], [126.3, 37.3]]
    ],
    "objects": {
        "법정구역_시군구_simplified": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Polygon", "arcs": [[0]],
                 "properties": {"SIG_CD": "11", "SIG_KOR_NM": "서울", "CTP_KOR_NM": "서울특별시"}},
                {"type": "Polygon", "arcs": [[1]],
                 "properties": {"SIG_CD": "26", "SIG_KOR_NM": "부산", "CTP_KOR_NM": "부산광역시"}},
                {"type": "Polygon", "arcs": [[2]],
                 "properties": {"SIG_CD": "28", "SIG_KOR_NM": "인천", "CTP_KOR_NM": "인천광역시"}}
            ]
        }
    }
}"#;

pub const MIGRATION_CSV: &str = "Year,DepartureCode,ArrivalCode,NetMigration\n\
2020,11,26,500\n\
2020,26,11,100\n\
2020,28,11,99\n\
2020,11,99,700\n\
2021,28,26,300\n";

pub type Controller = InteractionController<RasterOverlay, QueuedScheduler>;

/// Routes library logs to the test harness; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn container() -> ContainerSize {
    container_of(600.0, 800.0)
}

pub fn container_of(width: f64, height: f64) -> ContainerSize {
    ContainerSize::new(width, height)
}

pub fn provider() -> GeometryProvider {
    let topology = Topology::from_json_str(TOPOLOGY).unwrap();
    GeometryProvider::from_topology(&topology, &FlowConfig::default().topology_object).unwrap()
}

pub fn records() -> Vec<FlowRecord> {
    migration_flow::flow::read_migration_csv(MIGRATION_CSV.as_bytes()).unwrap()
}

pub fn controller_with(
    config: FlowConfig,
    records: Vec<FlowRecord>,
    year: &str,
) -> Controller {
    init_tracing();
    InteractionController::new(ControllerProps {
        config,
        provider: provider(),
        records,
        container: container(),
        year: year.to_string(),
        surface: RasterOverlay::new(container()),
        scheduler: QueuedScheduler::new(),
        seed: Some(2020),
    })
}

pub fn controller(year: &str) -> Controller {
    controller_with(FlowConfig::default(), records(), year)
}

/// Runs the pending frame at `now_ms`, as the host's display callback would.
pub fn run_frame(
    controller: &mut Controller,
    now_ms: f64,
) -> Option<migration_flow::render::FrameStats> {
    let id = controller.scheduler_mut().next_frame()?;
    controller.on_frame(id, now_ms)
}
