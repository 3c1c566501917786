//! Application routes and the navigation seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! `routes` describes which pages are public or protected; `navigation` is
//! the minimal router surface the session layer drives (read the current
//! route, replace it).

pub mod navigation;
pub mod routes;
