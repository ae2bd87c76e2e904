//! IANA Private Enterprise Numbers of BMC vendors.

macro_rules! iana {
    ($($name:ident = $id:literal => $display:literal,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum IanaManufacturer {
            $($name,)*
        }

        impl IanaManufacturer {
            pub const fn id(&self) -> u32 {
                match self {
                    $(Self::$name => $id,)*
                }
            }

            pub fn from_id(id: u32) -> Option<Self> {
                match id {
                    $($id => Some(Self::$name),)*
                    _ => None,
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$name => $display,)*
                }
            }
        }
    };
}

iana! {
    Ibm = 2 => "IBM",
    HewlettPackard = 11 => "Hewlett-Packard",
    Sun = 42 => "Sun Microsystems",
    Cisco = 9 => "Cisco",
    FujitsuSiemens = 231 => "Fujitsu Siemens Computers",
    Intel = 343 => "Intel Corporation",
    Dell = 674 => "Dell Inc.",
    Nec = 119 => "NEC",
    Tyan = 6653 => "Tyan Computer Corp.",
    Quanta = 7244 => "Quanta",
    Fujitsu = 10368 => "Fujitsu",
    Supermicro = 10876 => "Super Micro Computer Inc.",
    Inventec = 20569 => "Inventec Corporation",
    Wistron = 11129 => "Wistron",
    Penguin = 11102 => "Penguin Computing",
    Lenovo = 19046 => "Lenovo",
}

/// The name of the manufacturer with IANA enterprise number `id`.
pub fn manufacturer_name(id: u32) -> Option<&'static str> {
    IanaManufacturer::from_id(id).map(|m| m.name())
}

#[test]
fn known_manufacturers() {
    assert_eq!(manufacturer_name(674), Some("Dell Inc."));
    assert_eq!(IanaManufacturer::from_id(0x2880), Some(IanaManufacturer::Fujitsu));
    assert_eq!(IanaManufacturer::Inventec.id(), 20569);
    assert_eq!(manufacturer_name(0), None);
}
