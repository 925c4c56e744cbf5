use strum::{AsRefStr, EnumIter, EnumString};

use crate::{CreateError, DeleteError, Name, ReadError, UpdateError, UserID, ValidationError};

#[allow(async_fn_in_trait)]
pub trait EquipmentService {
    async fn get_equipment(&self, filter: &EquipmentFilter) -> Result<Vec<Equipment>, ReadError>;
    async fn create_equipment(
        &self,
        user_id: UserID,
        equipment: Equipment,
    ) -> Result<Equipment, CreateError>;
    async fn replace_equipment(
        &self,
        user_id: UserID,
        equipment: Equipment,
    ) -> Result<Equipment, UpdateError>;
    async fn delete_equipment(
        &self,
        user_id: UserID,
        id: EquipmentID,
    ) -> Result<EquipmentID, DeleteError>;

    /// One option per line, blank lines are dropped.
    fn validate_variation_options(&self, options: &str) -> Vec<String> {
        options
            .lines()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    fn validate_equipment_type(&self, equipment_type: &str) -> Result<EquipmentType, ValidationError> {
        equipment_type
            .parse::<EquipmentType>()
            .map_err(|_| ValidationError::Other("Invalid equipment type".into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait EquipmentRepository {
    async fn read_equipment(&self) -> Result<Vec<Equipment>, ReadError>;
    /// The id of the given equipment is replaced by a newly generated one.
    async fn create_equipment(&self, equipment: Equipment) -> Result<Equipment, CreateError>;
    async fn replace_equipment(&self, equipment: Equipment) -> Result<Equipment, UpdateError>;
    async fn delete_equipment(&self, id: EquipmentID) -> Result<EquipmentID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub id: EquipmentID,
    pub name: Name,
    pub description: String,
    pub equipment_type: EquipmentType,
    pub created_by: UserID,
    pub variations: Vec<EquipmentVariation>,
}

id!(EquipmentID);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentVariation {
    pub name: Name,
    pub options: Vec<String>,
}

#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum EquipmentType {
    Strength,
    Cardio,
    Body,
    Resistance,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EquipmentFilter {
    pub search: String,
    pub equipment_type: Option<EquipmentType>,
}

impl EquipmentFilter {
    #[must_use]
    pub fn equipment<'a>(
        &self,
        equipment: impl Iterator<Item = &'a Equipment>,
    ) -> Vec<&'a Equipment> {
        let search = self.search.trim().to_lowercase();
        equipment
            .filter(|e| {
                (search.is_empty()
                    || e.name.as_ref().to_lowercase().contains(&search)
                    || e.description.to_lowercase().contains(&search)
                    || e.equipment_type.as_ref().to_lowercase().contains(&search))
                    && self.equipment_type.is_none_or(|t| t == e.equipment_type)
            })
            .collect()
    }
}
