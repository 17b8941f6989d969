use serde_json::Value;

/// Maps an internal representation to its external JSON resource.
///
/// ```rust,ignore
/// struct ProductTransformer;
///
/// impl Transformer<product::Model> for ProductTransformer {
///     fn resource_key(&self) -> Option<&str> {
///         Some("products")
///     }
///
///     fn transform(&self, product: &product::Model) -> Value {
///         json!({"id": product.id, "name": product.name})
///     }
/// }
/// ```
pub trait Transformer<T>: Send + Sync {
    /// Name of the resource type, used in `Content-Range` headers for collections
    fn resource_key(&self) -> Option<&str> {
        None
    }

    fn transform(&self, item: &T) -> Value;

    /// Names accepted by [`include`](Self::include)
    fn available_includes(&self) -> &[&'static str] {
        &[]
    }

    /// A related resource to side-load under `included.<name>`.
    ///
    /// May return an object or an array of objects.
    fn include(&self, name: &str, item: &T) -> Option<Value> {
        let _ = (name, item);
        None
    }

    /// Expose the language hook when the output depends on the client's locale.
    fn as_translatable(&mut self) -> Option<&mut dyn Translatable> {
        None
    }
}

/// A transformer whose output is localized.
pub trait Translatable {
    /// Receives the client's preferred language, e.g. `fr_CH`, or an empty
    /// string when the client expressed none.
    fn set_language(&mut self, language: &str);
}
