//! Conversion of raw 8-bit readings into physical values.
//!
//! Reference: IPMI 2.0 Specification, Section 36.3 "Sensor Reading Conversion Formula"

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalogDataFormat {
    UnsignedByte,
    OnesComplement,
    TwosComplement,
    NotAnalog,
}

impl From<u8> for AnalogDataFormat {
    /// Decode bits [7:6] of the "sensor units 1" byte.
    fn from(sensor_units_1: u8) -> Self {
        match (sensor_units_1 >> 6) & 0b11 {
            0b00 => Self::UnsignedByte,
            0b01 => Self::OnesComplement,
            0b10 => Self::TwosComplement,
            _ => Self::NotAnalog,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Linearization {
    Linear,
    Ln,
    Log10,
    Log2,
    E,
    Exp10,
    Exp2,
    OneOverX,
    Sqr,
    Cube,
    Sqrt,
    CubeRoot,
    NonLinear(u8),
    Oem(u8),
}

impl From<u8> for Linearization {
    fn from(value: u8) -> Self {
        match value & 0x7F {
            0x00 => Self::Linear,
            0x01 => Self::Ln,
            0x02 => Self::Log10,
            0x03 => Self::Log2,
            0x04 => Self::E,
            0x05 => Self::Exp10,
            0x06 => Self::Exp2,
            0x07 => Self::OneOverX,
            0x08 => Self::Sqr,
            0x09 => Self::Cube,
            0x0A => Self::Sqrt,
            0x0B => Self::CubeRoot,
            v @ 0x70..=0x7F => Self::NonLinear(v),
            v => Self::Oem(v),
        }
    }
}

/// The coefficients `y = (M * x + B * 10^Bexp) * 10^Rexp` used to turn a
/// raw reading `x` into a physical value `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorCalibration {
    pub m: i16,
    pub b: i16,
    pub r_exponent: i8,
    pub b_exponent: i8,
    pub linearization: Linearization,
    pub analog_data_format: AnalogDataFormat,
}

/// Sign-extend the low `bits` bits of `value`.
fn sign_extend(value: u16, bits: u32) -> i16 {
    let shift = 16 - bits;
    ((value << shift) as i16) >> shift
}

impl SensorCalibration {
    /// A linear, unsigned calibration.
    pub fn linear(m: i16, b: i16, r_exponent: i8, b_exponent: i8) -> Self {
        Self {
            m,
            b,
            r_exponent,
            b_exponent,
            linearization: Linearization::Linear,
            analog_data_format: AnalogDataFormat::UnsignedByte,
        }
    }

    /// Extract the calibration from the body of a Full Sensor Record
    /// (the record data following the 5 byte record header).
    ///
    /// M and B are 10-bit two's complement, the exponents 4-bit two's complement.
    pub fn from_full_sensor_record(record_data: &[u8]) -> Option<Self> {
        if record_data.len() < 25 {
            return None;
        }

        let sensor_units_1 = record_data[15];
        let linearization = Linearization::from(record_data[18]);

        let m_raw = u16::from(record_data[19]) | (u16::from(record_data[20] & 0xC0) << 2);
        let b_raw = u16::from(record_data[21]) | (u16::from(record_data[22] & 0xC0) << 2);

        let exponents = record_data[24];
        let r_exponent = sign_extend(u16::from(exponents >> 4), 4) as i8;
        let b_exponent = sign_extend(u16::from(exponents & 0x0F), 4) as i8;

        Some(Self {
            m: sign_extend(m_raw, 10),
            b: sign_extend(b_raw, 10),
            r_exponent,
            b_exponent,
            linearization,
            analog_data_format: AnalogDataFormat::from(sensor_units_1),
        })
    }

    /// Interpret `raw` according to the analog data format.
    fn signed_input(&self, raw: u8) -> Option<i32> {
        match self.analog_data_format {
            AnalogDataFormat::UnsignedByte => Some(i32::from(raw)),
            AnalogDataFormat::TwosComplement => Some(i32::from(raw as i8)),
            AnalogDataFormat::OnesComplement => {
                if raw & 0x80 == 0x80 {
                    Some(-i32::from(!raw))
                } else {
                    Some(i32::from(raw))
                }
            }
            AnalogDataFormat::NotAnalog => None,
        }
    }
}

/// Convert a raw reading into a physical value.
///
/// Returns `None` when the value is not available: the sensor is not
/// analog, or it uses a non-linear conversion function.
pub fn decode_value(calibration: &SensorCalibration, raw: u8) -> Option<f64> {
    if calibration.linearization != Linearization::Linear {
        return None;
    }

    let x = f64::from(calibration.signed_input(raw)?);
    let m = f64::from(calibration.m);
    let b = f64::from(calibration.b);

    let b_scaled = b * 10f64.powi(i32::from(calibration.b_exponent));
    let value = (m * x + b_scaled) * 10f64.powi(i32::from(calibration.r_exponent));

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_format(format: AnalogDataFormat, m: i16, b: i16, r: i8, b_exp: i8) -> SensorCalibration {
        SensorCalibration {
            analog_data_format: format,
            ..SensorCalibration::linear(m, b, r, b_exp)
        }
    }

    #[test]
    fn linear_formula() {
        // 2 * 40 + 5 * 10^1 = 130, * 10^-1
        let cal = SensorCalibration::linear(2, 5, -1, 1);
        let value = decode_value(&cal, 40).unwrap();
        assert!((value - 13.0).abs() < 1e-9);

        let cal = SensorCalibration::linear(1, 0, 0, 0);
        assert_eq!(decode_value(&cal, 0x3A), Some(58.0));
    }

    #[test]
    fn signed_formats() {
        let twos = with_format(AnalogDataFormat::TwosComplement, 1, 0, 0, 0);
        assert_eq!(decode_value(&twos, 0xFF), Some(-1.0));
        assert_eq!(decode_value(&twos, 0x80), Some(-128.0));

        let ones = with_format(AnalogDataFormat::OnesComplement, 1, 0, 0, 0);
        assert_eq!(decode_value(&ones, 0xFE), Some(-1.0));
        assert_eq!(decode_value(&ones, 0x80), Some(-127.0));
        assert_eq!(decode_value(&ones, 0x7F), Some(127.0));
    }

    fn signed_order(format: AnalogDataFormat) -> Vec<u8> {
        let mut raws: Vec<u8> = (0..=255).collect();
        match format {
            AnalogDataFormat::UnsignedByte => {}
            AnalogDataFormat::TwosComplement => raws.sort_by_key(|r| *r as i8),
            AnalogDataFormat::OnesComplement => {
                // 0xFF is negative zero; drop it so the ordering is strict
                raws.retain(|r| *r != 0xFF);
                raws.sort_by_key(|r| if r & 0x80 == 0x80 { -i32::from(!r) } else { i32::from(*r) });
            }
            AnalogDataFormat::NotAnalog => raws.clear(),
        }
        raws
    }

    #[test]
    fn monotonic_for_positive_m() {
        let formats = [
            AnalogDataFormat::UnsignedByte,
            AnalogDataFormat::OnesComplement,
            AnalogDataFormat::TwosComplement,
        ];
        let coefficients = [(1, 0, 0, 0), (2, 5, -1, 1), (511, -512, -3, 7), (7, 100, 2, -8)];

        for format in formats {
            for (m, b, r, b_exp) in coefficients {
                let cal = with_format(format, m, b, r, b_exp);
                let values: Vec<f64> = signed_order(format)
                    .into_iter()
                    .map(|raw| decode_value(&cal, raw).unwrap())
                    .collect();

                assert!(
                    values.windows(2).all(|w| w[0] < w[1]),
                    "{format:?} with {:?} is not monotonic",
                    (m, b, r, b_exp)
                );
            }
        }
    }

    #[test]
    fn unavailable_values() {
        for raw in 0..=255u8 {
            let cal = with_format(AnalogDataFormat::NotAnalog, 3, 7, 1, -1);
            assert_eq!(decode_value(&cal, raw), None);
        }

        let cal = SensorCalibration {
            linearization: Linearization::Log10,
            ..SensorCalibration::linear(1, 0, 0, 0)
        };
        assert_eq!(decode_value(&cal, 10), None);
    }

    #[test]
    fn parse_full_sensor_record_coefficients() {
        let mut record = [0u8; 25];
        // 2's complement analog
        record[15] = 0x80;
        // M = -2 (0x3FE), tolerance 0
        record[19] = 0xFE;
        record[20] = 0xC0;
        // B = 300 (0x12C)
        record[21] = 0x2C;
        record[22] = 0x40;
        // Rexp = -2, Bexp = 1
        record[24] = 0xE1;

        let cal = SensorCalibration::from_full_sensor_record(&record).unwrap();
        assert_eq!(cal.m, -2);
        assert_eq!(cal.b, 300);
        assert_eq!(cal.r_exponent, -2);
        assert_eq!(cal.b_exponent, 1);
        assert_eq!(cal.linearization, Linearization::Linear);
        assert_eq!(cal.analog_data_format, AnalogDataFormat::TwosComplement);

        assert!(SensorCalibration::from_full_sensor_record(&record[..24]).is_none());
    }
}
