pub(crate) mod xml;

use crate::epub::errors::EpubError;

pub(crate) type ParserResult<T> = Result<T, EpubError>;
