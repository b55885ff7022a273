//! Built-in configurations for the two command variants.

use crate::schema::ResponseSchema;

/// Number of attribute labels sent per request unless overridden.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

const DESCRIPTION_INSTRUCTION: &str = "Sen bir veri modelleme uzmanısın, ingilizce gördüğün attribute alanlarının karşısına türkçe bir açıklama yaz. sadece 2-3 kelimelik bir cümle olarak. ID kelimesini veya ingilizce kelimeler kullanma. PK veya FK lar için Tekil anahtarı veya Dış Anahtarı tabirini kullan örnek: Customer ID -> Müşteri Tekil Anahtarı. Bayrak yerine bilgisi de, örnek: KVKK Flag -> KVKK bilgisi.  Accepted Commission Amount: Kabul Edilen Komisyon Tutarı";

const STEREOTYPE_INSTRUCTION: &str = "You are a data modeling expert working on a banking data model, based on the entity name and attribute, write 'stereotypes' depending on type of attribute. if the attribute must be in the model, write 'core', if it is not necessary, write empty string '', if it is an attribute that is specific for a local language or system, write 'local'. Example: Fact Customer;Customer ID;core  Fact Overdraft Contract;Contract Description;'' Dim City;side for istanbul;local";

/// Default model, instruction, chunk size, and response shape for one
/// command variant.
///
/// Both variants run through the same [`crate::Augmenter`]; a preset only
/// seeds the [`crate::AugmenterBuilder`].
///
/// # Examples
/// ```
/// use aura_core::Preset;
///
/// assert_eq!(Preset::DESCRIPTIONS.model, "gpt-4o-mini");
/// assert!(Preset::STEREOTYPES.schema.expects_entity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Short label used in diagnostics.
    pub name: &'static str,
    /// Default model identifier.
    pub model: &'static str,
    /// Default system instruction.
    pub instruction: &'static str,
    /// Default chunk size.
    pub chunk_size: usize,
    /// Response shape requested from the service.
    pub schema: &'static ResponseSchema,
}

impl Preset {
    /// Turkish descriptions for database attributes.
    pub const DESCRIPTIONS: Self = Self {
        name: "describe",
        model: "gpt-4o-mini",
        instruction: DESCRIPTION_INSTRUCTION,
        chunk_size: DEFAULT_CHUNK_SIZE,
        schema: &ResponseSchema::DESCRIPTIONS,
    };

    /// `core` / `local` / empty stereotype tags for the attributes of one
    /// entity.
    pub const STEREOTYPES: Self = Self {
        name: "stereotype",
        model: "gpt-4o",
        instruction: STEREOTYPE_INSTRUCTION,
        chunk_size: DEFAULT_CHUNK_SIZE,
        schema: &ResponseSchema::STEREOTYPES,
    };
}
