pub mod probe;
pub mod site;

pub use probe::{HttpProbe, Probe, ProbeError};
pub use site::SiteMonitor;
