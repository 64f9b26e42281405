use crate::merge::attributes::propagate_power_attributes;
use crate::model::RadarScan;
use crate::naming::MemberDescriptor;
use crate::prelude::MergeResult;
use log::debug;

/// Quantity name used for a donor quantity produced by a post-processing
/// descriptor: the original name followed by the descriptor's extension,
/// e.g. `ZDR` + `ZPHI_ITER_DEFAULT.dpatc` gives `ZDR.dpatc`.
pub fn disambiguated_quantity(quantity: &str, ppdf: &str) -> String {
    match ppdf.find('.') {
        Some(dot) => format!("{}{}", quantity, &ppdf[dot..]),
        None => format!("{}.{}", quantity, ppdf),
    }
}

/// Adds the single quantity of `donor` to `host`.
///
/// When the member came from a post-processing directory the donor's own
/// parameter is renamed in place before the copy, so a donor is consumed by
/// one merge pass: clone it first if it must be reused unchanged.
pub fn merge_parameter(
    host: &mut RadarScan,
    donor: &mut RadarScan,
    descriptor: &MemberDescriptor,
) -> MergeResult<()> {
    let mut quantity = donor.single_quantity()?.to_string();

    if !descriptor.ppdf.is_empty() {
        let renamed = disambiguated_quantity(&quantity, &descriptor.ppdf);
        if let Some(mut parameter) = donor.remove_parameter(&quantity) {
            debug!("renaming {} to {} ({})", quantity, renamed, descriptor.ppdf);
            parameter.quantity = renamed.clone();
            donor.add_parameter(parameter)?;
        }
        quantity = renamed;
    }

    if let Some(parameter) = donor.parameter(&quantity) {
        host.add_parameter(parameter.clone())?;
    }
    propagate_power_attributes(&mut host.attributes, &donor.attributes, &quantity);
    Ok(())
}
