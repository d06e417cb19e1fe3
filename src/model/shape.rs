// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

/// Node shapes supported by the flowchart markup.
///
/// Each shape owns exactly one opening/closing delimiter pair; the mapping is
/// bijective in both the parser and the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeShape {
    Rectangle,
    RoundedRect,
    Diamond,
    Circle,
    Parallelogram,
    Hexagon,
}

impl NodeShape {
    pub fn open_delimiter(&self) -> &'static str {
        match self {
            Self::Rectangle => "[",
            Self::RoundedRect => "(",
            Self::Diamond => "{",
            Self::Circle => "((",
            Self::Parallelogram => "[/",
            Self::Hexagon => "{{",
        }
    }

    pub fn close_delimiter(&self) -> &'static str {
        match self {
            Self::Rectangle => "]",
            Self::RoundedRect => ")",
            Self::Diamond => "}",
            Self::Circle => "))",
            Self::Parallelogram => "/]",
            Self::Hexagon => "}}",
        }
    }

    /// Match the shape whose opening delimiter starts `input`.
    ///
    /// Two-character delimiters win over their one-character prefixes, so
    /// `((` is a circle rather than a rounded rect around a parenthesis.
    pub fn from_open_delimiter(input: &str) -> Option<NodeShape> {
        const ORDERED: [NodeShape; 6] = [
            NodeShape::Circle,
            NodeShape::Parallelogram,
            NodeShape::Hexagon,
            NodeShape::Rectangle,
            NodeShape::RoundedRect,
            NodeShape::Diamond,
        ];
        ORDERED.into_iter().find(|shape| input.starts_with(shape.open_delimiter()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::RoundedRect => "roundedRect",
            Self::Diamond => "diamond",
            Self::Circle => "circle",
            Self::Parallelogram => "parallelogram",
            Self::Hexagon => "hexagon",
        }
    }
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownShapeError {
    name: String,
}

impl UnknownShapeError {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UnknownShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown node shape: {:?} (expected rectangle/roundedRect/diamond/circle/parallelogram/hexagon)",
            self.name
        )
    }
}

impl std::error::Error for UnknownShapeError {}

impl FromStr for NodeShape {
    type Err = UnknownShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(Self::Rectangle),
            "roundedRect" => Ok(Self::RoundedRect),
            "diamond" => Ok(Self::Diamond),
            "circle" => Ok(Self::Circle),
            "parallelogram" => Ok(Self::Parallelogram),
            "hexagon" => Ok(Self::Hexagon),
            _ => Err(UnknownShapeError { name: s.to_owned() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NodeShape;

    #[test]
    fn delimiter_mapping_is_bijective() {
        let shapes = [
            NodeShape::Rectangle,
            NodeShape::RoundedRect,
            NodeShape::Diamond,
            NodeShape::Circle,
            NodeShape::Parallelogram,
            NodeShape::Hexagon,
        ];
        for shape in shapes {
            assert_eq!(NodeShape::from_open_delimiter(shape.open_delimiter()), Some(shape));
        }
    }

    #[test]
    fn two_char_delimiters_win_over_prefixes() {
        assert_eq!(NodeShape::from_open_delimiter("((x"), Some(NodeShape::Circle));
        assert_eq!(NodeShape::from_open_delimiter("(x"), Some(NodeShape::RoundedRect));
        assert_eq!(NodeShape::from_open_delimiter("{{x"), Some(NodeShape::Hexagon));
        assert_eq!(NodeShape::from_open_delimiter("{x"), Some(NodeShape::Diamond));
        assert_eq!(NodeShape::from_open_delimiter("[/x"), Some(NodeShape::Parallelogram));
        assert_eq!(NodeShape::from_open_delimiter("[x"), Some(NodeShape::Rectangle));
    }

    #[test]
    fn shape_names_roundtrip() {
        for shape in [
            NodeShape::Rectangle,
            NodeShape::RoundedRect,
            NodeShape::Diamond,
            NodeShape::Circle,
            NodeShape::Parallelogram,
            NodeShape::Hexagon,
        ] {
            assert_eq!(shape.as_str().parse::<NodeShape>(), Ok(shape));
        }
    }
}
