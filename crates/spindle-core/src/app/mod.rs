//! App - アプリケーション層。
//!
//! engine とポートを組み合わせた消費側のロジック:
//! - **WorkerGroup / worker loop**: claim -> execute -> complete のポーリングループ
//! - **Executor**: 実行のプラグイン面（同梱は SimulatedExecutor）
//! - **RunCounts**: ステータス別のカウントビュー

pub mod executor;
pub mod status;
pub mod worker_loop;

pub use self::executor::{Executor, SimulatedExecutor};
pub use self::status::RunCounts;
pub use self::worker_loop::{WorkerConfig, WorkerGroup};
