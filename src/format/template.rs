use crate::error::FormatError;

/// A `%` directive of a format template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `%i`
    RecordId,
    /// `%d`
    Date,
    /// `%t`
    Time,
    /// `%s`
    SensorName,
    /// `%T`, and its alias `%g`
    SensorType,
    /// `%e`
    EventText,
    /// `%f`
    EventData2,
    /// `%h`
    EventData3,
    /// `%c`
    EventDataCombined,
    /// `%p`
    PreviousState,
    /// `%k`
    EventDirection,
    /// `%I`
    EventState,
    /// `%E`
    EventDetail,
    /// `%m`
    Manufacturer,
    /// `%o`
    OemBytes,
    /// `%O`
    OemText,
}

impl Directive {
    pub fn from_char(c: char) -> Option<Self> {
        let directive = match c {
            'i' => Self::RecordId,
            'd' => Self::Date,
            't' => Self::Time,
            's' => Self::SensorName,
            'T' | 'g' => Self::SensorType,
            'e' => Self::EventText,
            'f' => Self::EventData2,
            'h' => Self::EventData3,
            'c' => Self::EventDataCombined,
            'p' => Self::PreviousState,
            'k' => Self::EventDirection,
            'I' => Self::EventState,
            'E' => Self::EventDetail,
            'm' => Self::Manufacturer,
            'o' => Self::OemBytes,
            'O' => Self::OemText,
            _ => return None,
        };

        Some(directive)
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::RecordId => 'i',
            Self::Date => 'd',
            Self::Time => 't',
            Self::SensorName => 's',
            Self::SensorType => 'T',
            Self::EventText => 'e',
            Self::EventData2 => 'f',
            Self::EventData3 => 'h',
            Self::EventDataCombined => 'c',
            Self::PreviousState => 'p',
            Self::EventDirection => 'k',
            Self::EventState => 'I',
            Self::EventDetail => 'E',
            Self::Manufacturer => 'm',
            Self::OemBytes => 'o',
            Self::OemText => 'O',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Directive(Directive),
}

/// A parsed format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            match chars.next() {
                None => return Err(FormatError::UnterminatedDirective),
                Some('%') => literal.push('%'),
                Some(c) => {
                    let directive = Directive::from_char(c).ok_or(FormatError::UnknownDirective(c))?;

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(core::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Directive(directive));
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.segments.contains(&Segment::Directive(directive))
    }
}

impl From<Vec<Segment>> for Template {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl core::str::FromStr for Template {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
