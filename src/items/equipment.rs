use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{EquipmentInstance, EquipmentSlot, EquipmentTemplate};

/// Immutable equipment content store, keyed by template id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateRegistry {
    templates: HashMap<String, EquipmentTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a template, rejecting duplicate ids.
    pub fn insert(&mut self, template: EquipmentTemplate) -> Result<(), String> {
        if self.templates.contains_key(&template.id) {
            return Err(format!("duplicate template id: {}", template.id));
        }
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&EquipmentTemplate> {
        self.templates.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Loads a registry from a JSON array of templates.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let templates: Vec<EquipmentTemplate> =
            serde_json::from_str(json).map_err(|e| e.to_string())?;
        let mut registry = Self::new();
        for template in templates {
            registry.insert(template)?;
        }
        Ok(registry)
    }
}

/// An equipped instance resolved against its immutable template.
#[derive(Debug, Clone, Copy)]
pub struct ItemView<'a> {
    pub instance: &'a EquipmentInstance,
    pub template: &'a EquipmentTemplate,
}

/// Combatant equipment map. Exactly one item may occupy a slot at a time;
/// removed instances return to the caller (the inventory collaborator).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub head: Option<EquipmentInstance>,
    pub body: Option<EquipmentInstance>,
    pub legs: Option<EquipmentInstance>,
    pub feet: Option<EquipmentInstance>,
    pub weapon: Option<EquipmentInstance>,
    pub accessory: Option<EquipmentInstance>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: EquipmentSlot) -> &Option<EquipmentInstance> {
        match slot {
            EquipmentSlot::Head => &self.head,
            EquipmentSlot::Body => &self.body,
            EquipmentSlot::Legs => &self.legs,
            EquipmentSlot::Feet => &self.feet,
            EquipmentSlot::Weapon => &self.weapon,
            EquipmentSlot::Accessory => &self.accessory,
        }
    }

    pub fn get_mut(&mut self, slot: EquipmentSlot) -> &mut Option<EquipmentInstance> {
        match slot {
            EquipmentSlot::Head => &mut self.head,
            EquipmentSlot::Body => &mut self.body,
            EquipmentSlot::Legs => &mut self.legs,
            EquipmentSlot::Feet => &mut self.feet,
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Accessory => &mut self.accessory,
        }
    }

    /// Equips an instance into its slot, returning the displaced item so the
    /// caller can hand it back to inventory.
    pub fn set(
        &mut self,
        slot: EquipmentSlot,
        mut item: Option<EquipmentInstance>,
    ) -> Option<EquipmentInstance> {
        if let Some(inst) = item.as_mut() {
            inst.equipped = true;
        }
        let slot_ref = self.get_mut(slot);
        let mut previous = std::mem::replace(slot_ref, item);
        if let Some(prev) = previous.as_mut() {
            prev.equipped = false;
        }
        previous
    }

    pub fn iter_equipped(&self) -> impl Iterator<Item = &EquipmentInstance> {
        [
            &self.head,
            &self.body,
            &self.legs,
            &self.feet,
            &self.weapon,
            &self.accessory,
        ]
        .into_iter()
        .filter_map(|item| item.as_ref())
    }

    /// Resolves equipped instances against the registry. Instances whose
    /// template is missing from the registry are skipped.
    pub fn equipped_views<'a>(&'a self, registry: &'a TemplateRegistry) -> Vec<ItemView<'a>> {
        self.iter_equipped()
            .filter_map(|instance| {
                registry.get(&instance.template_id).map(|template| ItemView {
                    instance,
                    template,
                })
            })
            .collect()
    }
}
