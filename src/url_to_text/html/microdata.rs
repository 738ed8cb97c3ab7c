use crate::model::Microdata;
use log::debug;
use scraper::{ElementRef, Html, Selector};

pub struct MicroDataExtractor;

impl MicroDataExtractor {
    /// Recipe fields from `itemprop` markup, or `None` when the page marks
    /// up no ingredients at all
    pub fn extract(&self, document: &Html) -> Option<Microdata> {
        let root = document.root_element();

        let mut ingredients = self.get_itemprop_list(root, "recipeIngredient");
        if ingredients.is_empty() {
            ingredients = self.get_itemprop_list(root, "ingredients");
        }
        if ingredients.is_empty() {
            debug!("No microdata ingredients found");
            return None;
        }

        let instructions = self.get_instructions(root);
        let name = self.get_name(document).unwrap_or_default();
        debug!(
            "Microdata recipe '{}': {} ingredients, {} instructions",
            name,
            ingredients.len(),
            instructions.len()
        );

        Some(Microdata {
            name,
            ingredients,
            instructions,
        })
    }

    fn find_recipe_container<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        // Look for elements with itemscope and itemtype containing "Recipe"
        let selector = Selector::parse("[itemscope]").unwrap();
        document.select(&selector).find(|element| {
            element.value().attr("itemtype").is_some_and(|itemtype| {
                itemtype.contains("schema.org/Recipe")
                    || itemtype.contains("data-vocabulary.org/Recipe")
            })
        })
    }

    /// Name scoped to the Recipe item when there is one, then any
    /// `itemprop="name"`, then the first heading
    fn get_name(&self, document: &Html) -> Option<String> {
        self.find_recipe_container(document)
            .and_then(|container| self.get_itemprop(container, "name"))
            .or_else(|| self.get_itemprop(document.root_element(), "name"))
            .or_else(|| {
                let h1 = Selector::parse("h1").unwrap();
                document
                    .select(&h1)
                    .map(element_text)
                    .find(|text| !text.is_empty())
            })
    }

    fn get_instructions(&self, root: ElementRef) -> Vec<String> {
        let selector = Selector::parse("[itemprop~='recipeInstructions']").unwrap();
        let steps = Selector::parse("[itemprop~='step'], [itemprop~='text'], li").unwrap();

        let mut instructions = Vec::new();
        for container in root.select(&selector) {
            // A HowToStep `li` wraps its own `text`; only the outer match counts
            let nested: Vec<String> = container
                .select(&steps)
                .filter(|step| step.id() != container.id())
                .filter(|step| !has_matching_ancestor(*step, container, &steps))
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect();

            if nested.is_empty() {
                let text = element_text(container);
                if !text.is_empty() {
                    instructions.push(text);
                }
            } else {
                instructions.extend(nested);
            }
        }

        // A standalone HowToStep list without a recipeInstructions wrapper
        if instructions.is_empty() {
            instructions = self.get_itemprop_list(root, "step");
        }
        instructions
    }

    fn get_itemprop(&self, root: ElementRef, prop: &str) -> Option<String> {
        let selector = Selector::parse(&format!("[itemprop~='{}']", prop)).ok()?;
        root.select(&selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    }

    fn get_itemprop_list(&self, root: ElementRef, prop: &str) -> Vec<String> {
        let mut items = Vec::new();
        let Ok(selector) = Selector::parse(&format!("[itemprop~='{}']", prop)) else {
            return items;
        };
        for el in root.select(&selector) {
            let text = element_text(el);
            if !text.is_empty() {
                items.push(text);
            }
        }
        items
    }
}

/// Whether an element between `element` and `container` also matches
fn has_matching_ancestor(element: ElementRef, container: ElementRef, selector: &Selector) -> bool {
    element
        .ancestors()
        .take_while(|node| node.id() != container.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| selector.matches(&ancestor))
}

/// Whitespace-collapsed text of an element
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
