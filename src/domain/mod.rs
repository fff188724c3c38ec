// Domain 層：任務模型與 ports (介面)，由 core 與 config 實作

pub mod model;
pub mod ports;
