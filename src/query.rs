//! Query parameter values and their wire encoding.
//!
//! Profitbase expects list filters as repeated keys (`ids[]=1&ids[]=2`) and scalar filters as
//! plain form pairs, with booleans spelled `true`/`false` and nulls spelled `null`.
//! [`build_query_string`] emits every single-valued pair first and every list-valued pair
//! second, each group keeping the order the keys were inserted in.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::_prelude::*;

/// Scalar query value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
	/// Encoded as the literal `null`.
	Null,
	/// Encoded as `true` or `false`.
	Bool(bool),
	/// Integer value.
	Int(i64),
	/// Floating point value; integral values drop the fraction (`2.0` encodes as `2`).
	Float(f64),
	/// Text value, encoded verbatim before percent-encoding.
	Str(String),
}
impl Display for Scalar {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Null => f.write_str("null"),
			Self::Bool(true) => f.write_str("true"),
			Self::Bool(false) => f.write_str("false"),
			Self::Int(value) => write!(f, "{value}"),
			Self::Float(value) => write!(f, "{value}"),
			Self::Str(value) => f.write_str(value),
		}
	}
}
impl<T> From<Option<T>> for Scalar
where
	T: Into<Scalar>,
{
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

/// Value stored under one query key: a single scalar or a list of scalars.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
	/// Emitted once as `key=value`.
	Single(Scalar),
	/// Emitted as one `key=value` pair per element, in list order.
	Multi(Vec<Scalar>),
}
impl From<Scalar> for QueryValue {
	fn from(value: Scalar) -> Self {
		Self::Single(value)
	}
}
impl<T> From<Option<T>> for QueryValue
where
	T: Into<Scalar>,
{
	fn from(value: Option<T>) -> Self {
		Self::Single(value.into())
	}
}
impl<T> From<Vec<T>> for QueryValue
where
	T: Into<Scalar>,
{
	fn from(values: Vec<T>) -> Self {
		Self::Multi(values.into_iter().map(Into::into).collect())
	}
}

macro_rules! impl_scalar_from {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl From<$ty> for Scalar {
				fn from(value: $ty) -> Self {
					Self::$variant(value.into())
				}
			}
			impl From<$ty> for QueryValue {
				fn from(value: $ty) -> Self {
					Self::Single(value.into())
				}
			}
		)*
	};
}
impl_scalar_from! {
	bool => Bool,
	i8 => Int,
	i16 => Int,
	i32 => Int,
	i64 => Int,
	u8 => Int,
	u16 => Int,
	u32 => Int,
	f64 => Float,
	String => Str,
	&str => Str,
}

macro_rules! impl_wide_int_from {
	($($ty:ty),* $(,)?) => {
		$(
			impl From<$ty> for Scalar {
				fn from(value: $ty) -> Self {
					i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
				}
			}
			impl From<$ty> for QueryValue {
				fn from(value: $ty) -> Self {
					Self::Single(value.into())
				}
			}
		)*
	};
}
// Values outside the `i64` range keep their exact decimal text.
impl_wide_int_from!(isize, u64, usize, i128, u128);

impl From<f32> for Scalar {
	fn from(value: f32) -> Self {
		// Round-trip through the shortest decimal text so `0.1f32` encodes as `0.1`.
		Self::Float(value.to_string().parse().unwrap_or_else(|_| value.into()))
	}
}
impl From<f32> for QueryValue {
	fn from(value: f32) -> Self {
		Self::Single(value.into())
	}
}

/// Insertion-ordered query parameter map.
///
/// Writing an existing key replaces its value in place, so later writes win without moving
/// the key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams(Vec<(String, QueryValue)>);
impl QueryParams {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces `key`.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
		let key = key.into();
		let value = value.into();

		match self.0.iter_mut().find(|(existing, _)| *existing == key) {
			Some((_, slot)) => *slot = value,
			None => self.0.push((key, value)),
		}
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
		self.insert(key, value);

		self
	}

	/// Inserts `key` only when `value` is present.
	pub fn with_opt<V>(mut self, key: impl Into<String>, value: Option<V>) -> Self
	where
		V: Into<QueryValue>,
	{
		if let Some(value) = value {
			self.insert(key, value);
		}

		self
	}

	/// Writes every entry of `other` on top of `self`; entries from `other` win.
	pub fn merge(&mut self, other: QueryParams) {
		for (key, value) in other.0 {
			self.insert(key, value);
		}
	}

	/// Builder-style [`merge`](Self::merge).
	pub fn merged(mut self, other: QueryParams) -> Self {
		self.merge(other);

		self
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&QueryValue> {
		self.0.iter().find(|(existing, _)| existing == key).map(|(_, value)| value)
	}

	/// Iterates over entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Number of keys.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the map holds no keys.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for QueryParams
where
	K: Into<String>,
	V: Into<QueryValue>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut params = Self::new();

		params.extend(iter);

		params
	}
}
impl<K, V> Extend<(K, V)> for QueryParams
where
	K: Into<String>,
	V: Into<QueryValue>,
{
	fn extend<I>(&mut self, iter: I)
	where
		I: IntoIterator<Item = (K, V)>,
	{
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}

/// Encodes `params` into a query string without the leading `?`.
///
/// Single-valued pairs come first, list-valued pairs second; an empty map yields an empty
/// string.
pub fn build_query_string(params: &QueryParams) -> String {
	let mut single = Serializer::new(String::new());
	let mut multi = Serializer::new(String::new());

	for (key, value) in params.iter() {
		match value {
			QueryValue::Single(scalar) => {
				single.append_pair(key, &scalar.to_string());
			},
			QueryValue::Multi(scalars) =>
				for scalar in scalars {
					multi.append_pair(key, &scalar.to_string());
				},
		}
	}

	[single.finish(), multi.finish()]
		.into_iter()
		.filter(|fragment| !fragment.is_empty())
		.collect::<Vec<_>>()
		.join("&")
}
