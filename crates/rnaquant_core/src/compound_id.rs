//! Compound identifiers for hierarchically addressed records.
//!
//! # Responsibility
//! - Encode an ancestry chain of local ids into one opaque token.
//! - Decode tokens back into segments for a depth fixed by the entity kind.
//!
//! # Invariants
//! - Segments are never empty and never contain [`ID_DELIMITER`].
//! - `decode(&encode(s)?, s.len())? == s` for every valid segment sequence.
//! - Depth is an associated constant of the kind marker and is never
//!   inferred from the token being decoded.
//!
//! # Wire format
//! - `<dataset>:<set>[:<quantification>[:<expression level>]]`.
//! - Delimiter and per-kind depth are part of the external contract.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter, Write};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

/// Separator between segments of an encoded compound id.
pub const ID_DELIMITER: char = ':';

pub type IdResult<T> = Result<T, CompoundIdError>;

/// Encoding/decoding failures for compound identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompoundIdError {
    /// A local id is empty or contains the delimiter.
    InvalidSegment { segment: String },
    /// A token does not split into the depth required by the target kind.
    MalformedIdentifier {
        token: String,
        expected_depth: usize,
        actual_depth: usize,
    },
}

impl Display for CompoundIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSegment { segment } => {
                write!(f, "invalid compound id segment `{segment}`")
            }
            Self::MalformedIdentifier {
                token,
                expected_depth,
                actual_depth,
            } => write!(
                f,
                "malformed compound id `{token}`: expected {expected_depth} segments, got {actual_depth}"
            ),
        }
    }
}

impl Error for CompoundIdError {}

/// Joins local-id segments into one token.
///
/// # Errors
/// - `InvalidSegment` when the sequence is empty, or when any segment is
///   empty or contains [`ID_DELIMITER`].
pub fn encode<S: AsRef<str>>(segments: &[S]) -> IdResult<String> {
    if segments.is_empty() {
        return Err(CompoundIdError::InvalidSegment {
            segment: String::new(),
        });
    }

    let mut token = String::new();
    for (index, segment) in segments.iter().enumerate() {
        let segment = segment.as_ref();
        validate_segment(segment)?;
        if index > 0 {
            token.push(ID_DELIMITER);
        }
        token.push_str(segment);
    }
    Ok(token)
}

/// Splits a token into exactly `expected_depth` segments.
///
/// # Errors
/// - `MalformedIdentifier` when the segment count differs from
///   `expected_depth` or when any segment is empty.
pub fn decode(token: &str, expected_depth: usize) -> IdResult<Vec<String>> {
    let segments: Vec<&str> = token.split(ID_DELIMITER).collect();
    if segments.len() != expected_depth || segments.iter().any(|segment| segment.is_empty()) {
        return Err(CompoundIdError::MalformedIdentifier {
            token: token.to_string(),
            expected_depth,
            actual_depth: segments.len(),
        });
    }
    Ok(segments.into_iter().map(str::to_string).collect())
}

/// Checks that one local id can be embedded in a compound id.
pub fn validate_segment(segment: &str) -> IdResult<()> {
    if segment.is_empty() || segment.contains(ID_DELIMITER) {
        return Err(CompoundIdError::InvalidSegment {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

/// Entity kind addressed by a compound id.
pub trait IdKind {
    /// Number of segments in a token of this kind.
    const DEPTH: usize;
    /// Human-readable kind name used in diagnostics.
    const NAME: &'static str;
}

/// Kind that owns children of another kind.
pub trait ParentKind: IdKind {
    type Child: IdKind;
}

/// Kind that is owned by a container of another kind.
pub trait ChildKind: IdKind {
    type Parent: IdKind;
}

/// Root container.
pub enum DatasetKind {}
/// Quantification set owned by a dataset.
pub enum QuantificationSetKind {}
/// Quantification owned by a quantification set.
pub enum QuantificationKind {}
/// Expression level owned by a quantification.
pub enum ExpressionLevelKind {}

impl IdKind for DatasetKind {
    const DEPTH: usize = 1;
    const NAME: &'static str = "dataset";
}

impl IdKind for QuantificationSetKind {
    const DEPTH: usize = 2;
    const NAME: &'static str = "rna_quantification_set";
}

impl IdKind for QuantificationKind {
    const DEPTH: usize = 3;
    const NAME: &'static str = "rna_quantification";
}

impl IdKind for ExpressionLevelKind {
    const DEPTH: usize = 4;
    const NAME: &'static str = "expression_level";
}

impl ParentKind for DatasetKind {
    type Child = QuantificationSetKind;
}

impl ParentKind for QuantificationSetKind {
    type Child = QuantificationKind;
}

impl ParentKind for QuantificationKind {
    type Child = ExpressionLevelKind;
}

impl ChildKind for QuantificationSetKind {
    type Parent = DatasetKind;
}

impl ChildKind for QuantificationKind {
    type Parent = QuantificationSetKind;
}

impl ChildKind for ExpressionLevelKind {
    type Parent = QuantificationKind;
}

pub type DatasetId = CompoundId<DatasetKind>;
pub type QuantificationSetId = CompoundId<QuantificationSetKind>;
pub type QuantificationId = CompoundId<QuantificationKind>;
pub type ExpressionLevelId = CompoundId<ExpressionLevelKind>;

/// Validated compound id for entities of kind `K`.
///
/// Segments are stored root-to-leaf; the last segment is the local id.
pub struct CompoundId<K> {
    segments: Vec<String>,
    kind: PhantomData<fn() -> K>,
}

impl<K> CompoundId<K> {
    fn from_validated(segments: Vec<String>) -> Self {
        Self {
            segments,
            kind: PhantomData,
        }
    }

    /// Ancestry chain, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Local id of the addressed entity within its parent.
    pub fn local_id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Encoded token form.
    pub fn token(&self) -> String {
        self.to_string()
    }

    /// Returns whether `ancestor` is a strict prefix of this id.
    pub fn is_descendant_of<P>(&self, ancestor: &CompoundId<P>) -> bool {
        ancestor.segments.len() < self.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }
}

impl<K: IdKind> CompoundId<K> {
    /// Parses a token as an id of kind `K`.
    pub fn parse(token: &str) -> IdResult<Self> {
        decode(token, K::DEPTH).map(Self::from_validated)
    }

    /// Builds an id from an explicit ancestry chain.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> IdResult<Self> {
        let token = encode(segments)?;
        if segments.len() != K::DEPTH {
            return Err(CompoundIdError::MalformedIdentifier {
                token,
                expected_depth: K::DEPTH,
                actual_depth: segments.len(),
            });
        }
        Ok(Self::from_validated(
            segments
                .iter()
                .map(|segment| segment.as_ref().to_string())
                .collect(),
        ))
    }

    pub fn kind_name(&self) -> &'static str {
        K::NAME
    }
}

impl CompoundId<DatasetKind> {
    /// Builds the root id of a dataset.
    pub fn root(local_id: &str) -> IdResult<Self> {
        validate_segment(local_id)?;
        Ok(Self::from_validated(vec![local_id.to_string()]))
    }
}

impl<K: ParentKind> CompoundId<K> {
    /// Composes the id of a direct child from its local id.
    pub fn child(&self, local_id: &str) -> IdResult<CompoundId<K::Child>> {
        validate_segment(local_id)?;
        let mut segments = self.segments.clone();
        segments.push(local_id.to_string());
        Ok(CompoundId::from_validated(segments))
    }
}

impl<K: ChildKind> CompoundId<K> {
    /// Id of the owning container.
    pub fn parent(&self) -> CompoundId<K::Parent> {
        let parent_len = self.segments.len().saturating_sub(1);
        CompoundId::from_validated(self.segments[..parent_len].to_vec())
    }
}

impl<K> Clone for CompoundId<K> {
    fn clone(&self) -> Self {
        Self::from_validated(self.segments.clone())
    }
}

impl<K> PartialEq for CompoundId<K> {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl<K> Eq for CompoundId<K> {}

impl<K> Hash for CompoundId<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl<K> PartialOrd for CompoundId<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for CompoundId<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.segments.cmp(&other.segments)
    }
}

impl<K> Display for CompoundId<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_char(ID_DELIMITER)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl<K> Debug for CompoundId<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompoundId({self})")
    }
}

impl<K: IdKind> FromStr for CompoundId<K> {
    type Err = CompoundIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}
