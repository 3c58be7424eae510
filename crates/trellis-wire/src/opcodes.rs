//! Opcode numbering for wire-format tuples.

use crate::WireError;

/// The leading element of every wire-format tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SexpOpcode {
    // Statements
    /// Static text content
    Text = 0,
    /// Append the value of an expression
    Append = 1,
    /// HTML comment
    Comment = 2,
    /// Element modifier invocation
    Modifier = 3,
    /// Curly block invocation
    Block = 4,
    /// Angle-bracket invocation of a statically named component
    Component = 5,
    /// Angle-bracket invocation whose head is an expression
    DynamicComponent = 6,
    /// Start of an element
    OpenElement = 7,
    /// End of an element's attributes
    FlushElement = 8,
    /// End of an element
    CloseElement = 9,
    /// Attribute with a literal value
    StaticAttr = 10,
    /// Attribute with an expression value
    DynamicAttr = 11,
    /// Attribute on a component or splattable element
    ComponentAttr = 12,
    /// `...attributes`
    AttrSplat = 13,
    /// `{{yield}}`
    Yield = 14,
    /// `{{partial}}`
    Partial = 15,
    /// Named argument with an expression value
    DynamicArg = 16,
    /// Named argument with a literal value
    StaticArg = 17,
    /// Attribute whose value is not escaped
    TrustingDynamicAttr = 18,
    /// Component attribute whose value is not escaped
    TrustingComponentAttr = 19,
    /// `{{debugger}}`
    Debugger = 20,

    // Expressions
    /// The undefined value
    Undefined = 21,
    /// Helper call
    Call = 22,
    /// String concatenation
    Concat = 23,
    /// Read a symbol slot
    GetSymbol = 24,
    /// Read a free variable without context
    GetFree = 25,
    /// Read a free variable in a known syntactic context
    GetContextualFree = 26,
    /// Property path lookup
    GetPath = 27,
    /// `has-block`
    HasBlock = 28,
    /// `has-block-params`
    HasBlockParams = 29,
}

impl SexpOpcode {
    /// Returns true for opcodes that begin an expression tuple.
    pub fn is_expression(self) -> bool {
        (self as u8) >= SexpOpcode::Undefined as u8
    }

    /// Returns true for opcodes that may appear in a component's attribute list.
    pub fn is_attribute(self) -> bool {
        matches!(
            self,
            SexpOpcode::StaticAttr
                | SexpOpcode::DynamicAttr
                | SexpOpcode::ComponentAttr
                | SexpOpcode::TrustingDynamicAttr
                | SexpOpcode::TrustingComponentAttr
                | SexpOpcode::AttrSplat
                | SexpOpcode::Modifier
        )
    }
}

impl TryFrom<u8> for SexpOpcode {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use SexpOpcode::*;
        Ok(match value {
            0 => Text,
            1 => Append,
            2 => Comment,
            3 => Modifier,
            4 => Block,
            5 => Component,
            6 => DynamicComponent,
            7 => OpenElement,
            8 => FlushElement,
            9 => CloseElement,
            10 => StaticAttr,
            11 => DynamicAttr,
            12 => ComponentAttr,
            13 => AttrSplat,
            14 => Yield,
            15 => Partial,
            16 => DynamicArg,
            17 => StaticArg,
            18 => TrustingDynamicAttr,
            19 => TrustingComponentAttr,
            20 => Debugger,
            21 => Undefined,
            22 => Call,
            23 => Concat,
            24 => GetSymbol,
            25 => GetFree,
            26 => GetContextualFree,
            27 => GetPath,
            28 => HasBlock,
            29 => HasBlockParams,
            other => return Err(WireError::UnknownOpcode(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_round_trips_through_u8() {
        for raw in 0..=29u8 {
            let op = SexpOpcode::try_from(raw).unwrap();
            assert_eq!(op as u8, raw);
        }
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            SexpOpcode::try_from(30),
            Err(WireError::UnknownOpcode(30))
        );
    }

    #[test]
    fn test_expression_partition() {
        assert!(!SexpOpcode::Debugger.is_expression());
        assert!(SexpOpcode::Undefined.is_expression());
        assert!(SexpOpcode::HasBlockParams.is_expression());
    }
}
