//! appwarden 공통 크레이트
//!
//! 설치된 소프트웨어 인벤토리 도구의 모든 크레이트가 공유하는
//! 에러 타입, `appwarden.toml` 설정, 메트릭 이름을 정의합니다.
//!
//! # 모듈 구조
//!
//! - [`error`]: 최상위 에러 (`AppwardenError`) 및 도메인별 에러
//! - [`config`]: TOML 설정 파싱, 환경변수 오버라이드, 검증
//! - [`metrics`]: 메트릭 이름 상수 및 설명 등록

pub mod config;
pub mod error;
pub mod metrics;

// --- 주요 타입 re-export ---

// 에러
pub use error::{AppwardenError, ConfigError, InventoryError};

// 설정
pub use config::{AppwardenConfig, AuditConfig, GeneralConfig, InventoryConfig, SearchConfig};
