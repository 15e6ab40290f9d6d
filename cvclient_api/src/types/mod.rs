mod request;
pub use self::request::{AlertsRequest, ChartRequest, StatusRequest, Timeframe};

mod response;
pub use self::response::{AlertValue, AlertsResponse, ChartResponse, Payload, StatusResponse};
