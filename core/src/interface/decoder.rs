use crate::model::RadarObject;
use log::warn;

/// Turns a member or file payload into a radar object.
pub trait Decoder: Send + Sync {
    /// Cheap format sniff; no decoding is attempted.
    fn is_recognized(&self, buffer: &[u8]) -> bool;

    /// `None` when the buffer looks right but cannot be decoded.
    fn decode(&self, name: &str, buffer: &[u8]) -> Option<RadarObject>;
}

/// Radar objects serialised as JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn is_recognized(&self, buffer: &[u8]) -> bool {
        buffer
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'{')
    }

    fn decode(&self, name: &str, buffer: &[u8]) -> Option<RadarObject> {
        match serde_json::from_slice::<RadarObject>(buffer) {
            Ok(mut object) => {
                if let RadarObject::Volume(volume) = &mut object {
                    let order = volume.order();
                    volume.sort_by_elevations(order);
                }
                Some(object)
            }
            Err(err) => {
                warn!("{} is corrupt: {}", name, err);
                None
            }
        }
    }
}
