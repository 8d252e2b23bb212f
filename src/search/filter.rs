/// Preset search terms offered as one-key shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Brown,
    Lava,
    Ocean,
    Space,
    Cats,
    Orca,
    Dogs,
}

impl Filter {
    pub const ALL: [Filter; 7] = [
        Filter::Brown,
        Filter::Lava,
        Filter::Ocean,
        Filter::Space,
        Filter::Cats,
        Filter::Orca,
        Filter::Dogs,
    ];

    /// Query term sent to the API
    pub fn term(&self) -> &'static str {
        match self {
            Filter::Brown => "brown",
            Filter::Lava => "lava",
            Filter::Ocean => "ocean",
            Filter::Space => "space",
            Filter::Cats => "cats",
            Filter::Orca => "orca",
            Filter::Dogs => "dogs",
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            Filter::Brown => "Brown",
            Filter::Lava => "Lava",
            Filter::Ocean => "Ocean",
            Filter::Space => "Space",
            Filter::Cats => "Cats",
            Filter::Orca => "Orca",
            Filter::Dogs => "Dogs",
        }
    }

    /// Filter bound to a 1-based digit key
    pub fn from_digit(digit: char) -> Option<Filter> {
        let index = digit.to_digit(10)?.checked_sub(1)? as usize;
        Self::ALL.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_are_lowercase_labels() {
        for filter in Filter::ALL {
            assert_eq!(filter.term(), filter.label().to_lowercase());
        }
    }

    #[test]
    fn test_from_digit() {
        assert_eq!(Filter::from_digit('1'), Some(Filter::Brown));
        assert_eq!(Filter::from_digit('5'), Some(Filter::Cats));
        assert_eq!(Filter::from_digit('7'), Some(Filter::Dogs));
        assert_eq!(Filter::from_digit('0'), None);
        assert_eq!(Filter::from_digit('8'), None);
        assert_eq!(Filter::from_digit('x'), None);
    }
}
