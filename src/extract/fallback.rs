use scraper::{Html, Selector};

use super::{attr_value, element_text};

type Strategy<'a, T> = Box<dyn Fn(&Html) -> Option<T> + 'a>;

/// Ordered lookup strategies for one field; the first `Some` wins.
pub struct Fallback<'a, T> {
    strategies: Vec<Strategy<'a, T>>,
}

impl<'a, T> Fallback<'a, T> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn or(mut self, strategy: impl Fn(&Html) -> Option<T> + 'a) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn resolve(&self, document: &Html) -> Option<T> {
        self.strategies.iter().find_map(|strategy| strategy(document))
    }
}

impl<T> Default for Fallback<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Fallback<'static, String> {
    /// Text of the first element matching each selector, in order.
    pub fn texts(selectors: &'static [Selector]) -> Self {
        selectors
            .iter()
            .fold(Self::new(), |chain, selector| chain.or(text_of(selector)))
    }
}

/// Whitespace-collapsed text of the first match, if non-empty.
pub fn text_of(selector: &Selector) -> impl Fn(&Html) -> Option<String> + '_ {
    move |document| document.select(selector).next().and_then(element_text)
}

/// Non-empty attribute of the first match that carries it.
pub fn attr_of<'a>(
    selector: &'a Selector,
    attr: &'static str,
) -> impl Fn(&Html) -> Option<String> + 'a {
    move |document| document.select(selector).find_map(|el| attr_value(el, attr))
}
