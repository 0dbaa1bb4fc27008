use crate::epub::errors::EpubError;
use crate::parser::ParserResult;
use quick_xml::Reader;
use quick_xml::escape;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use std::error::Error;

pub(crate) type ByteReader<'a> = Reader<&'a [u8]>;

pub(crate) fn reader(content: &str) -> ByteReader<'_> {
    Reader::from_str(content)
}

pub(crate) trait XmlReader<'a> {
    /// Iterator-like method to read the next [`Event`].
    ///
    /// Start and empty elements have their attributes checked,
    /// so duplicate or malformed attributes surface as errors here.
    fn next(&mut self) -> Option<ParserResult<Event<'a>>>;

    /// Reads until the next start or empty element, skipping all other events.
    fn next_element(&mut self) -> Option<ParserResult<BytesStart<'a>>> {
        while let Some(result) = self.next() {
            match result {
                Ok(Event::Start(el) | Event::Empty(el)) => return Some(Ok(el)),
                Ok(_) => {}
                Err(error) => return Some(Err(error)),
            }
        }
        None
    }
}

impl<'a> XmlReader<'a> for ByteReader<'a> {
    fn next(&mut self) -> Option<ParserResult<Event<'a>>> {
        match self.read_event() {
            Ok(Event::Eof) => None,
            Ok(event @ (Event::Start(_) | Event::Empty(_))) => {
                let checked = match &event {
                    Event::Start(el) | Event::Empty(el) => el
                        .attributes()
                        .try_for_each(|attribute| attribute.map(drop))
                        .map_err(unparsable),
                    _ => Ok(()),
                };
                Some(checked.map(|_| event))
            }
            result => Some(result.map_err(unparsable)),
        }
    }
}

pub(crate) trait XmlElement<'a> {
    /// Matches regardless of any namespace prefix (`opf:item` == `item`).
    fn is_local_name(&self, local_name: impl AsRef<[u8]>) -> bool;

    /// Retrieves the unescaped value of the attribute by its exact `key`.
    fn get_attribute(&self, key: impl AsRef<[u8]>) -> Option<String>;
}

impl<'a> XmlElement<'a> for BytesStart<'a> {
    fn is_local_name(&self, target_local_name: impl AsRef<[u8]>) -> bool {
        self.local_name().as_ref() == target_local_name.as_ref()
    }

    fn get_attribute(&self, key: impl AsRef<[u8]>) -> Option<String> {
        let attribute = self.try_get_attribute(key).ok()??;
        let raw = String::from_utf8_lossy(&attribute.value);

        // Unknown entities are kept verbatim
        Some(
            escape::unescape(&raw)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| raw.to_string()),
        )
    }
}

fn unparsable(error: impl Error + Send + Sync + 'static) -> EpubError {
    EpubError::Unparsable(Box::new(error))
}
