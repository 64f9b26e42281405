use crate::model::Attributes;
use lazy_static::lazy_static;
use regex::Regex;

const POWER_ROOTS: [&str; 3] = ["TXpower", "peakpwr", "avgpwr"];

lazy_static! {
    static ref DUAL_POL: Regex = Regex::new(r"^U?(ZDR|RHOHV|PHIDP|KDP)").unwrap();
    static ref SINGLE_POL_HV: Regex = Regex::new(r"^(T|DBZ|VRAD|WRAD|SNR|SQI)(H|V)").unwrap();
}

/// Polarization class of a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarization {
    Dual,
    Single,
}

impl Polarization {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Dual => "dual",
            Self::Single => "single",
        }
    }
}

/// Copies every attribute of `src` that `dst` lacks; existing names are
/// never overwritten and their values are not compared.
/// Returns the number of attributes copied.
pub fn copy_missing_attributes(dst: &mut Attributes, src: &Attributes) -> usize {
    let mut copied = 0;
    for (name, value) in src.iter() {
        if !dst.contains(name) {
            dst.add(name, value.clone());
            copied += 1;
        }
    }
    copied
}

/// Dual polarization covers the differential quantities, optionally
/// uncorrected (`U` prefix), unless the name is a single-pol moment with an
/// H/V channel suffix.
pub fn classify_polarization(quantity: &str) -> Polarization {
    if DUAL_POL.is_match(quantity) && !SINGLE_POL_HV.is_match(quantity) {
        Polarization::Dual
    } else {
        Polarization::Single
    }
}

/// Stores `how/TXpower`, `how/peakpwr` and `how/avgpwr` of `src` under
/// `how/{dual,single}-pol_{root}` on `dst`, unless already there.
pub fn propagate_power_attributes(dst: &mut Attributes, src: &Attributes, quantity: &str) {
    let prefix = classify_polarization(quantity).prefix();
    for root in POWER_ROOTS {
        let qualified = format!("how/{}-pol_{}", prefix, root);
        if dst.contains(&qualified) {
            continue;
        }
        if let Some(value) = src.get(&format!("how/{}", root)) {
            dst.add(qualified, value.clone());
        }
    }
}
