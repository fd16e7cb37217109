//! Built-in application catalogue.
//!
//! Plans are data: ordered catalogue strings plus a template table per
//! application. Grouped by kind:
//! - `monitoring`: release-tarball and exporter services
//! - `services`: in-house services built from source under `/opt`
//! - `sftrip`: source build cloned with secondary credentials
//! - `ubuntu`: base host preparation

pub mod monitoring;
pub mod services;
pub mod sftrip;
pub mod ubuntu;

use crate::component::Component;
use crate::registry::ComponentFactory;

fn alertboard() -> Box<dyn Component> {
    Box::new(services::ALERTBOARD)
}

fn alerthistory() -> Box<dyn Component> {
    Box::new(services::ALERTHISTORY)
}

fn alertmanager() -> Box<dyn Component> {
    Box::new(monitoring::ALERTMANAGER)
}

fn certmanager() -> Box<dyn Component> {
    Box::new(services::CERTMANAGER)
}

fn edicheck() -> Box<dyn Component> {
    Box::new(services::EDICHECK)
}

fn f5exporter() -> Box<dyn Component> {
    Box::new(monitoring::F5_EXPORTER)
}

fn glec() -> Box<dyn Component> {
    Box::new(services::GLEC)
}

fn journexd() -> Box<dyn Component> {
    Box::new(services::JOURNEXD)
}

fn morphocm() -> Box<dyn Component> {
    Box::new(services::MORPHOCM)
}

fn nodeexp() -> Box<dyn Component> {
    Box::new(monitoring::NODE_EXPORTER)
}

fn prometheus() -> Box<dyn Component> {
    Box::new(monitoring::PROMETHEUS)
}

fn sftrip() -> Box<dyn Component> {
    Box::new(sftrip::Sftrip)
}

fn ubuntu() -> Box<dyn Component> {
    Box::new(ubuntu::UBUNTU)
}

/// Registry entries for every built-in application, in listing order.
pub const BUILTIN: &[(&str, ComponentFactory)] = &[
    ("f5exporter", f5exporter),
    ("alerthistory", alerthistory),
    ("morphocm", morphocm),
    ("alertmanager", alertmanager),
    ("prometheus", prometheus),
    ("sftrip", sftrip),
    ("edicheck", edicheck),
    ("alertboard", alertboard),
    ("certmanager", certmanager),
    ("journexd", journexd),
    ("nodeexp", nodeexp),
    ("glec", glec),
    ("ubuntu", ubuntu),
];
