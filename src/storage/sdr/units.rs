//! Sensor unit type codes.
//!
//! Reference: IPMI 2.0 Specification, Section 43.17 "Sensor Unit Type Codes"

macro_rules ! unit {
    {
        $($name:ident = [$value:literal, $abbreviation:literal, $long:literal],)*
    } => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Unit {
            $($name,)*
            Unknown(u8),
        }

        impl Unit {
            pub fn abbreviation(&self) -> &'static str {
                match self {
                    $(Self::$name => $abbreviation,)*
                    Self::Unknown(_) => "unknown",
                }
            }

            pub fn long_name(&self) -> &'static str {
                match self {
                    $(Self::$name => $long,)*
                    Self::Unknown(_) => "unknown",
                }
            }
        }

        impl From<u8> for Unit {
            fn from(value: u8) -> Self {
                match value {
                    $($value => Self::$name,)*
                    _ => Self::Unknown(value),
                }
            }
        }

        impl From<Unit> for u8 {
            fn from(value: Unit) -> Self {
                match value {
                    $(Unit::$name => $value,)*
                    Unit::Unknown(v) => v,
                }
            }
        }
    }
}

unit! {
    Unspecified = [0, "unspecified", "unspecified"],
    DegreesCelsius = [1, "C", "degrees C"],
    DegreesFahrenheit = [2, "F", "degrees F"],
    DegreesKelvin = [3, "K", "degrees K"],
    Volt = [4, "V", "Volts"],
    Amp = [5, "A", "Amps"],
    Watt = [6, "W", "Watts"],
    Joule = [7, "J", "Joules"],
    Coulomb = [8, "C", "Coulombs"],
    VoltAmpere = [9, "VA", "VA"],
    Nit = [10, "nits", "nits"],
    Lumen = [11, "lm", "lumen"],
    Lux = [12, "lx", "lux"],
    Candela = [13, "cd", "Candela"],
    KiloPascal = [14, "kPa", "kPa"],
    PoundsPerSquareInch = [15, "PSI", "PSI"],
    Newton = [16, "N", "Newton"],
    CubicFeetPerMinute = [17, "CFM", "CFM"],
    RevolutionsPerMinute = [18, "RPM", "RPM"],
    Hertz = [19, "Hz", "Hz"],
    Microsecond = [20, "us", "microsecond"],
    Millisecond = [21, "ms", "millisecond"],
    Second = [22, "s", "second"],
    Minute = [23, "min", "minute"],
    Hour = [24, "hr", "hour"],
    Day = [25, "d", "day"],
    Week = [26, "wk", "week"],
    Mil = [27, "mil", "mil"],
    Inch = [28, "in", "inches"],
    Foot = [29, "ft", "feet"],
    CubicInch = [30, "cu in", "cu in"],
    CubicFoot = [31, "cu ft", "cu feet"],
    Millimeter = [32, "mm", "mm"],
    Centimeter = [33, "cm", "cm"],
    Meter = [34, "m", "m"],
    CubicCentimeter = [35, "cu cm", "cu cm"],
    CubicMeter = [36, "cu m", "cu m"],
    Liter = [37, "L", "liters"],
    FluidOunce = [38, "fl oz", "fluid ounce"],
    Radian = [39, "rad", "radians"],
    Steradian = [40, "sr", "steradians"],
    Revolution = [41, "rev", "revolutions"],
    Cycle = [42, "cycles", "cycles"],
    Gravity = [43, "G", "gravities"],
    Ounce = [44, "oz", "ounce"],
    Pound = [45, "lb", "pound"],
    FootPound = [46, "ft lb", "ft-lb"],
    OunceInch = [47, "oz in", "oz-in"],
    Gauss = [48, "Gs", "gauss"],
    Gilbert = [49, "Gb", "gilberts"],
    Henry = [50, "H", "henry"],
    Millihenry = [51, "mH", "millihenry"],
    Farad = [52, "F", "farad"],
    Microfarad = [53, "uF", "microfarad"],
    Ohm = [54, "Ohm", "ohms"],
    Siemens = [55, "S", "siemens"],
    Mole = [56, "mol", "mole"],
    Becquerel = [57, "Bq", "becquerel"],
    PartsPerMillion = [58, "PPM", "PPM"],
    Decibel = [60, "dB", "Decibels"],
    AWeightedDecibel = [61, "dBA", "DbA"],
    CWeightedDecibel = [62, "dBC", "DbC"],
    Gray = [63, "Gy", "gray"],
    Sievert = [64, "Sv", "sievert"],
    ColorTemperatureDegreesKelvin = [65, "K", "color temp deg K"],
    Bit = [66, "b", "bit"],
    Kilobit = [67, "Kb", "kilobit"],
    Megabit = [68, "Mb", "megabit"],
    Gigabit = [69, "Gb", "gigabit"],
    Byte = [70, "B", "byte"],
    Kilobyte = [71, "KB", "kilobyte"],
    Megabyte = [72, "MB", "megabyte"],
    Gigabyte = [73, "GB", "gigabyte"],
    Word = [74, "word", "word"],
    DoubleWord = [75, "dword", "dword"],
    QuadWord = [76, "qword", "qword"],
    CacheLine = [77, "line", "line"],
    Hit = [78, "hit", "hit"],
    Miss = [79, "miss", "miss"],
    Retry = [80, "retry", "retry"],
    Reset = [81, "reset", "reset"],
    OverrunOrOverflow = [82, "overrun", "overrun/overflow"],
    Underrun = [83, "underrun", "underrun"],
    Collision = [84, "collision", "collision"],
    Packet = [85, "packets", "packets"],
    Message = [86, "messages", "messages"],
    Character = [87, "characters", "characters"],
    Error = [88, "error", "error"],
    CorrectableError = [89, "correctable error", "correctable error"],
    UncorrectableError = [90, "uncorrectable error", "uncorrectable error"],
    FatalError = [91, "fatal error", "fatal error"],
    Gram = [92, "grams", "grams"],
}

impl Unit {
    /// Render `value` with two decimals followed by this unit.
    ///
    /// Percentage sensors are rendered with `%` regardless of the base unit.
    pub fn display(&self, value: f64, abbreviated: bool, percentage: bool) -> String {
        if percentage {
            format!("{value:.2}%")
        } else if abbreviated {
            format!("{value:.2} {}", self.abbreviation())
        } else {
            format!("{value:.2} {}", self.long_name())
        }
    }
}

#[test]
fn display_tests() {
    use Unit::*;

    assert_eq!(DegreesCelsius.display(32.0, true, false), "32.00 C");
    assert_eq!(DegreesCelsius.display(32.0, false, false), "32.00 degrees C");
    assert_eq!(RevolutionsPerMinute.display(-1.5, true, false), "-1.50 RPM");
    assert_eq!(Unspecified.display(55.0, true, true), "55.00%");
    assert_eq!(Unit::from(59), Unknown(59));
    assert_eq!(u8::from(Unit::from(18)), 18);
}
