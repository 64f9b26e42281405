use crate::merge::attributes::{copy_missing_attributes, propagate_power_attributes};
use crate::merge::parameter::merge_parameter;
use crate::model::RadarScan;
use crate::naming::MemberDescriptor;
use crate::prelude::{MergeError, MergeResult};
use log::debug;

/// Combines single-parameter scans of one sweep into a multi-parameter scan.
///
/// The first scan is the template. Quantities already on the host are left
/// alone, and attributes follow first-wins. Callers sort inputs
/// case-insensitively by source file name for reproducible output.
pub fn merge_decoded_scans<'a, I>(scans: I) -> MergeResult<RadarScan>
where
    I: IntoIterator<Item = &'a RadarScan>,
{
    let mut scans = scans.into_iter();
    let mut host = scans.next().ok_or(MergeError::NoInput)?.clone();
    let mut merged = 1;

    for scan in scans {
        merged += 1;
        for parameter in scan.parameters() {
            if !host.has_parameter(&parameter.quantity) {
                host.add_parameter(parameter.clone())?;
            }
        }
        copy_missing_attributes(&mut host.attributes, &scan.attributes);
        if let Some(quantity) = scan.dominant_quantity() {
            propagate_power_attributes(&mut host.attributes, &scan.attributes, quantity);
        }
    }
    debug!(
        "merged {} scans at {:.2} deg into {:?}",
        merged,
        host.elangle,
        host.parameter_names()
    );
    Ok(host)
}

/// Folds one raw member into the accumulator, creating it on first use.
///
/// A new accumulator is a copy of the donor stripped of its quantity, so it
/// keeps the donor's geometry and top-level attributes only.
pub fn merge_raw_members(
    accumulator: Option<RadarScan>,
    donor: &mut RadarScan,
    descriptor: &MemberDescriptor,
) -> MergeResult<RadarScan> {
    let mut host = match accumulator {
        Some(host) => host,
        None => {
            let quantity = donor.single_quantity()?.to_string();
            let mut host = donor.clone();
            host.remove_parameter(&quantity);
            host
        }
    };
    merge_parameter(&mut host, donor, descriptor)?;
    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeValue;
    use crate::testing::single_parameter_scan;

    fn flat(quantity: &str) -> MemberDescriptor {
        MemberDescriptor::from_flat_path(&format!("2015120916500500{}.azi", quantity)).unwrap()
    }

    #[test]
    fn decoded_scans_union_their_quantities() {
        let scans = vec![
            single_parameter_scan("DBZH", 0.5),
            single_parameter_scan("VRADH", 0.5),
            single_parameter_scan("ZDR", 0.5),
        ];
        let merged = merge_decoded_scans(&scans).unwrap();
        assert_eq!(merged.parameter_names(), vec!["DBZH", "VRADH", "ZDR"]);
        assert_eq!(merged.parameter("ZDR").unwrap().data, scans[2].parameter("ZDR").unwrap().data);
    }

    #[test]
    fn decoded_scans_keep_first_attribute_value() {
        let mut first = single_parameter_scan("DBZH", 0.5);
        first.attributes.add("how/wavelength", 5.3);
        let mut second = single_parameter_scan("KDP", 0.5);
        second.attributes.add("how/wavelength", 10.0);
        second.attributes.add("how/TXpower", 300.0);

        let merged = merge_decoded_scans(&[first, second]).unwrap();
        assert_eq!(merged.attributes.get("how/wavelength"), Some(&AttributeValue::Double(5.3)));
        assert_eq!(merged.attributes.get("how/TXpower"), Some(&AttributeValue::Double(300.0)));
        assert_eq!(
            merged.attributes.get("how/dual-pol_TXpower"),
            Some(&AttributeValue::Double(300.0))
        );
    }

    #[test]
    fn repeated_quantity_is_skipped_not_replaced() {
        let first = single_parameter_scan("DBZH", 0.5);
        let mut second = single_parameter_scan("DBZH", 0.5);
        second.remove_parameter("DBZH");
        second
            .add_parameter(crate::model::Parameter::new("DBZH", crate::testing::ramp(99.0)))
            .unwrap();

        let merged = merge_decoded_scans(&[first.clone(), second]).unwrap();
        assert_eq!(merged.number_of_parameters(), 1);
        assert_eq!(merged.parameter("DBZH"), first.parameter("DBZH"));
    }

    #[test]
    fn empty_input_is_an_error() {
        let none: Vec<RadarScan> = Vec::new();
        assert!(matches!(merge_decoded_scans(&none), Err(MergeError::NoInput)));
    }

    #[test]
    fn raw_members_accumulate_into_fresh_host() {
        let mut dbz = single_parameter_scan("DBZH", 0.5);
        dbz.attributes.add("how/task", "DOPVOL1_A");
        let mut zdr = single_parameter_scan("ZDR", 0.5);
        zdr.attributes.add("how/task", "other");

        let acc = merge_raw_members(None, &mut dbz, &flat("dBZ")).unwrap();
        assert_eq!(acc.parameter_names(), vec!["DBZH"]);
        let acc = merge_raw_members(Some(acc), &mut zdr, &flat("ZDR")).unwrap();

        assert_eq!(acc.parameter_names(), vec!["DBZH", "ZDR"]);
        assert_eq!(
            acc.attributes.get("how/task"),
            Some(&AttributeValue::String("DOPVOL1_A".into()))
        );
    }
}
