use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Signedness of the raw bit field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Unsigned,
    Signed,
}

/// How the raw bits of a signal are presented to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalFormat {
    /// Scaled physical value, "data not available" patterns become NaN
    Number,
    /// Raw integer (lookup values, identifiers, flags)
    Integer,
    /// Fixed width ASCII text
    Ascii,
    /// Variable length string with length and encoding header bytes
    StringLau,
    /// Raw bytes
    Binary,
}

/// Traffic category of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageCategory {
    Ais,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    pub name: String,
    pub start_bit: u16,
    /// Bit length. Zero on variable length formats means "to end of payload".
    pub length: u16,
    pub value_type: ValueType,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub unit: Option<String>,
    pub format: SignalFormat,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    pub pgn: u32,
    pub name: String,
    pub category: MessageCategory,
    pub signals: Vec<SignalDescriptor>,
}

impl MessageDescriptor {
    pub fn signal(&self, name: &str) -> Option<&SignalDescriptor> {
        self.signals.iter().find(|s| s.name == name)
    }
}

/// Read-only signal metadata indexed by PGN
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<u32, MessageDescriptor>,
}

impl MessageCatalog {
    pub fn new(messages: Vec<MessageDescriptor>) -> Self {
        Self {
            messages: messages.into_iter().map(|m| (m.pgn, m)).collect(),
        }
    }

    /// Load a catalog from a JSON array of message descriptors
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let messages: Vec<MessageDescriptor> = serde_json::from_str(&contents)?;
        Ok(Self::new(messages))
    }

    pub fn message(&self, pgn: u32) -> Option<&MessageDescriptor> {
        self.messages.get(&pgn)
    }

    pub fn signal(&self, pgn: u32, name: &str) -> Option<&SignalDescriptor> {
        self.message(pgn).and_then(|m| m.signal(name))
    }

    pub fn category(&self, pgn: u32) -> Option<MessageCategory> {
        self.message(pgn).map(|m| m.category)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Catalog of the PGNs the gateway translates, canboat bit layouts.
    pub fn builtin() -> Self {
        use MessageCategory::{Ais, Plain};
        Self::new(vec![
            message(127250, "Vessel_Heading", Plain, &[
                int("Sid", 0, 8),
                unum("Heading", 8, 16, 0.0001, "rad"),
                snum("Deviation", 24, 16, 0.0001, "rad"),
                snum("Variation", 40, 16, 0.0001, "rad"),
                int("Reference", 56, 2),
            ]),
            message(127251, "Rate_Of_Turn", Plain, &[
                int("Sid", 0, 8),
                snum("Rate", 8, 32, 3.125e-8, "rad/s"),
            ]),
            message(127257, "Attitude", Plain, &[
                int("Sid", 0, 8),
                snum("Yaw", 8, 16, 0.0001, "rad"),
                snum("Pitch", 24, 16, 0.0001, "rad"),
                snum("Roll", 40, 16, 0.0001, "rad"),
            ]),
            message(127508, "Battery_Status", Plain, &[
                int("Battery_Instance", 0, 8),
                snum("Battery_Voltage", 8, 16, 0.01, "V"),
                snum("Battery_Current", 24, 16, 0.1, "A"),
                unum("Battery_Case_Temperature", 40, 16, 0.01, "K"),
                int("Sid", 56, 8),
            ]),
            message(128259, "Speed_Water_Referenced", Plain, &[
                int("Sid", 0, 8),
                unum("Speed_Water_Referenced", 8, 16, 0.01, "m/s"),
                unum("Speed_Ground_Referenced", 24, 16, 0.01, "m/s"),
                int("Speed_Water_Referenced_Type", 40, 8),
            ]),
            message(128267, "Water_Depth", Plain, &[
                int("Sid", 0, 8),
                unum("Water_Depth_Transducer", 8, 32, 0.01, "m"),
                snum("Offset", 40, 16, 0.001, "m"),
                unum("Maximum_Range_Scale", 56, 8, 10.0, "m"),
            ]),
            message(129025, "Position_Rapid_Update", Plain, &[
                snum("Latitude", 0, 32, 1e-7, "deg"),
                snum("Longitude", 32, 32, 1e-7, "deg"),
            ]),
            message(129026, "Cog_Sog_Rapid_Update", Plain, &[
                int("Sid", 0, 8),
                int("Cog_Reference", 8, 2),
                unum("Course_Over_Ground", 16, 16, 0.0001, "rad"),
                unum("Speed_Over_Ground", 32, 16, 0.01, "m/s"),
            ]),
            message(129029, "Gnss_Position_Data", Plain, &[
                int("Sid", 0, 8),
                unum("Position_Date", 8, 16, 1.0, "d"),
                unum("Position_Time", 24, 32, 0.0001, "s"),
                snum("Latitude", 56, 64, 1e-16, "deg"),
                snum("Longitude", 120, 64, 1e-16, "deg"),
                snum("Altitude", 184, 64, 1e-6, "m"),
                int("Type_Of_System", 248, 4),
                int("Method_Gnss", 252, 4),
                int("Integrity", 256, 2),
                int("Number_Of_Svs", 264, 8),
                snum("Hdop", 272, 16, 0.01, ""),
                snum("Pdop", 288, 16, 0.01, ""),
                snum("Geoidal_Separation", 304, 32, 0.01, "m"),
            ]),
            message(130306, "Wind_Data", Plain, &[
                int("Sid", 0, 8),
                unum("Wind_Speed", 8, 16, 0.01, "m/s"),
                unum("Wind_Angle", 24, 16, 0.0001, "rad"),
                int("Reference", 40, 3),
            ]),
            message(130310, "Environmental_Parameters", Plain, &[
                int("Sid", 0, 8),
                unum("Water_Temperature", 8, 16, 0.01, "K"),
                unum("Outside_Ambient_Air_Temperature", 24, 16, 0.01, "K"),
                unum("Atmospheric_Pressure", 40, 16, 100.0, "Pa"),
            ]),
            message(129038, "Ais_Class_A_Position_Report", Ais, &[
                int("Message_Id", 0, 6),
                int("Repeat_Indicator", 6, 2),
                int("User_Id", 8, 32),
                snum("Longitude", 40, 32, 1e-7, "deg"),
                snum("Latitude", 72, 32, 1e-7, "deg"),
                int("Position_Accuracy", 104, 1),
                int("Raim_Flag", 105, 1),
                int("Time_Stamp", 106, 6),
                unum("Cog", 112, 16, 0.0001, "rad"),
                unum("Sog", 128, 16, 0.01, "m/s"),
                int("Communication_State", 144, 19),
                int("Ais_Transceiver_Information", 163, 5),
                unum("True_Heading", 168, 16, 0.0001, "rad"),
                snum("Rate_Of_Turn", 184, 16, 3.125e-5, "rad/s"),
                int("Navigational_Status", 200, 4),
                int("Special_Maneuver_Indicator", 204, 2),
                int("Sequence_Id", 216, 8),
            ]),
            message(129039, "Ais_Class_B_Position_Report", Ais, &[
                int("Message_Id", 0, 6),
                int("Repeat_Indicator", 6, 2),
                int("User_Id", 8, 32),
                snum("Longitude", 40, 32, 1e-7, "deg"),
                snum("Latitude", 72, 32, 1e-7, "deg"),
                int("Position_Accuracy", 104, 1),
                int("Raim_Flag", 105, 1),
                int("Time_Stamp", 106, 6),
                unum("Cog", 112, 16, 0.0001, "rad"),
                unum("Sog", 128, 16, 0.01, "m/s"),
                int("Communication_State", 144, 19),
                int("Ais_Transceiver_Information", 163, 5),
                unum("True_Heading", 168, 16, 0.0001, "rad"),
                int("Regional_Application", 184, 8),
                int("Class_B_Unit_Flag", 194, 1),
                int("Class_B_Display_Flag", 195, 1),
                int("Class_B_Dsc_Flag", 196, 1),
                int("Class_B_Band_Flag", 197, 1),
                int("Class_B_Msg_22_Flag", 198, 1),
                int("Mode_Flag", 199, 1),
                int("Communication_State_Selector_Flag", 200, 1),
            ]),
            message(129041, "Ais_Aids_To_Navigation_Report", Ais, &[
                int("Message_Id", 0, 6),
                int("Repeat_Indicator", 6, 2),
                int("User_Id", 8, 32),
                snum("Longitude", 40, 32, 1e-7, "deg"),
                snum("Latitude", 72, 32, 1e-7, "deg"),
                int("Position_Accuracy", 104, 1),
                int("Raim_Flag", 105, 1),
                int("Time_Stamp", 106, 6),
                unum("Ship_Length", 112, 16, 0.1, "m"),
                unum("Ship_Beam", 128, 16, 0.1, "m"),
                unum("Position_Reference_Point_From_Starboard", 144, 16, 0.1, "m"),
                unum("Position_Reference_Point_Aft_Of_Ship_S_Bow", 160, 16, 0.1, "m"),
                int("Aid_Type", 176, 5),
                int("Off_Position", 181, 1),
                int("Virtual_Aid", 182, 1),
                int("Mode_Flag", 183, 1),
                int("Type_Of_Electronic_Positioning_Device", 185, 4),
                int("Regional", 192, 8),
                int("Ais_Transceiver_Information", 200, 5),
                signal("Name", 208, 0, SignalFormat::StringLau, 1.0, None),
            ]),
            message(129794, "Ais_Class_A_Static_And_Voyage_Related_Data", Ais, &[
                int("Message_Id", 0, 6),
                int("Repeat_Indicator", 6, 2),
                int("User_Id", 8, 32),
                int("Imo", 40, 32),
                ascii("Call_Sign", 72, 56),
                ascii("Name", 128, 160),
                int("Ship_Cargo_Type", 288, 8),
                unum("Ship_Length", 296, 16, 0.1, "m"),
                unum("Ship_Beam", 312, 16, 0.1, "m"),
                unum("Position_Reference_Point_From_Starboard", 328, 16, 0.1, "m"),
                unum("Position_Reference_Point_Aft_Of_Ship_S_Bow", 344, 16, 0.1, "m"),
                unum("Estimated_Date_Of_Arrival", 360, 16, 1.0, "d"),
                unum("Estimated_Time_Of_Arrival", 376, 32, 0.0001, "s"),
                unum("Draft", 408, 16, 0.01, "m"),
                ascii("Destination", 424, 160),
                int("Ais_Version", 584, 2),
                int("Type_Of_Electronic_Positioning_Device", 586, 4),
                int("Data_Terminal_Equipment_Dte", 590, 1),
                int("Ais_Transceiver_Information", 592, 5),
                int("Sequence_Id", 600, 8),
            ]),
            message(129797, "Ais_Binary_Broadcast_Message", Ais, &[
                int("Message_Id", 0, 6),
                int("Repeat_Indicator", 6, 2),
                int("Source_Id", 8, 32),
                int("Ais_Transceiver_Information", 41, 5),
                int("Number_Of_Bits", 48, 16),
                signal("Binary_Data", 64, 0, SignalFormat::Binary, 1.0, None),
            ]),
            message(129809, "Ais_Class_B_Cs_Static_Report_Part_A", Ais, &[
                int("Message_Id", 0, 6),
                int("Repeat_Indicator", 6, 2),
                int("User_Id", 8, 32),
                ascii("Name", 40, 160),
                int("Ais_Transceiver_Information", 200, 5),
                int("Sequence_Id", 208, 8),
            ]),
            message(129810, "Ais_Class_B_Cs_Static_Report_Part_B", Ais, &[
                int("Message_Id", 0, 6),
                int("Repeat_Indicator", 6, 2),
                int("User_Id", 8, 32),
                int("Ship_Cargo_Type", 40, 8),
                ascii("Vendor_Id", 48, 24),
                signal("Serial_Number", 72, 32, SignalFormat::Binary, 1.0, None),
                ascii("Call_Sign", 104, 56),
                unum("Ship_Length", 160, 16, 0.1, "m"),
                unum("Ship_Beam", 176, 16, 0.1, "m"),
                unum("Position_Reference_Point_From_Starboard", 192, 16, 0.1, "m"),
                unum("Position_Reference_Point_Aft_Of_Ship_S_Bow", 208, 16, 0.1, "m"),
                int("Mother_Ship_Mmsi", 224, 32),
                int("Ais_Transceiver_Information", 264, 5),
                int("Sequence_Id", 272, 8),
            ]),
        ])
    }
}

fn message(pgn: u32, name: &str, category: MessageCategory, signals: &[SignalDescriptor]) -> MessageDescriptor {
    MessageDescriptor {
        pgn,
        name: name.to_string(),
        category,
        signals: signals.to_vec(),
    }
}

fn signal(name: &str, start_bit: u16, length: u16, format: SignalFormat, scale: f64, unit: Option<&str>) -> SignalDescriptor {
    SignalDescriptor {
        name: name.to_string(),
        start_bit,
        length,
        value_type: ValueType::Unsigned,
        scale,
        unit: unit.map(str::to_string),
        format,
    }
}

fn int(name: &str, start_bit: u16, length: u16) -> SignalDescriptor {
    signal(name, start_bit, length, SignalFormat::Integer, 1.0, None)
}

fn ascii(name: &str, start_bit: u16, length: u16) -> SignalDescriptor {
    signal(name, start_bit, length, SignalFormat::Ascii, 1.0, None)
}

fn unum(name: &str, start_bit: u16, length: u16, scale: f64, unit: &str) -> SignalDescriptor {
    signal(name, start_bit, length, SignalFormat::Number, scale, Some(unit))
}

fn snum(name: &str, start_bit: u16, length: u16, scale: f64, unit: &str) -> SignalDescriptor {
    SignalDescriptor {
        value_type: ValueType::Signed,
        ..unum(name, start_bit, length, scale, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = MessageCatalog::builtin();
        let lat = catalog.signal(129025, "Latitude").unwrap();
        assert_eq!(lat.start_bit, 0);
        assert_eq!(lat.length, 32);
        assert_eq!(lat.value_type, ValueType::Signed);
        assert!(catalog.signal(129025, "Altitude").is_none());
        assert!(catalog.message(59904).is_none());
    }

    #[test]
    fn test_builtin_categories() {
        let catalog = MessageCatalog::builtin();
        assert_eq!(catalog.category(129038), Some(MessageCategory::Ais));
        assert_eq!(catalog.category(129810), Some(MessageCategory::Ais));
        assert_eq!(catalog.category(128267), Some(MessageCategory::Plain));
        assert_eq!(catalog.category(1), None);
    }

    #[test]
    fn test_class_a_layout_fills_28_bytes() {
        let catalog = MessageCatalog::builtin();
        let msg = catalog.message(129038).unwrap();
        let end = msg
            .signals
            .iter()
            .map(|s| s.start_bit as usize + s.length as usize)
            .max()
            .unwrap();
        assert_eq!(end, 224);
    }

    #[test]
    fn test_catalog_deserialization() {
        let json = r#"[{
            "pgn": 65000,
            "name": "Test",
            "category": "plain",
            "signals": [
                {"name": "Value", "start_bit": 8, "length": 16, "value_type": "signed", "scale": 0.5, "format": "number"},
                {"name": "Flag", "start_bit": 24, "length": 1, "value_type": "unsigned", "format": "integer"}
            ]
        }]"#;
        let messages: Vec<MessageDescriptor> = serde_json::from_str(json).unwrap();
        let catalog = MessageCatalog::new(messages);
        assert_eq!(catalog.len(), 1);
        let flag = catalog.signal(65000, "Flag").unwrap();
        assert_eq!(flag.scale, 1.0);
        assert_eq!(flag.format, SignalFormat::Integer);
        assert_eq!(catalog.signal(65000, "Value").unwrap().scale, 0.5);
    }
}
