use std::collections::BTreeMap;

use ironplan_domain as domain;
use rusqlite::{Transaction, params};

use super::{Error, Sqlite, encode_list, id, list, name, new_id, text};

fn insert_variations(transaction: &Transaction, equipment: &domain::Equipment) -> Result<(), Error> {
    let mut statement = transaction.prepare(
        "INSERT INTO equipment_variations (equipment_id, position, name, options)
        VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, variation) in equipment.variations.iter().enumerate() {
        statement.execute(params![
            *equipment.id,
            position,
            variation.name.as_ref(),
            encode_list(&variation.options)?
        ])?;
    }
    Ok(())
}

impl domain::EquipmentRepository for Sqlite {
    async fn read_equipment(&self) -> Result<Vec<domain::Equipment>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut variations = BTreeMap::<domain::EquipmentID, Vec<_>>::new();
                let mut statement = connection.prepare(
                    "SELECT equipment_id, name, options FROM equipment_variations
                    ORDER BY equipment_id, position",
                )?;
                let rows = statement.query_map([], |row| {
                    Ok((
                        id::<domain::EquipmentID>(row, 0)?,
                        domain::EquipmentVariation {
                            name: name(row, 1)?,
                            options: list(row, 2, "options")?,
                        },
                    ))
                })?;
                for row in rows {
                    let (equipment_id, variation) = row?;
                    variations.entry(equipment_id).or_default().push(variation);
                }

                let mut statement = connection.prepare(
                    "SELECT id, name, description, equipment_type, created_by FROM equipment
                    ORDER BY name",
                )?;
                let equipment = statement
                    .query_map([], |row| {
                        let id = id(row, 0)?;
                        Ok(domain::Equipment {
                            id,
                            name: name(row, 1)?,
                            description: row.get(2)?,
                            equipment_type: text(row, 3)?,
                            created_by: super::id(row, 4)?,
                            variations: variations.remove(&id).unwrap_or_default(),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(equipment)
            })
            .await?)
    }

    async fn create_equipment(
        &self,
        equipment: domain::Equipment,
    ) -> Result<domain::Equipment, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let equipment = domain::Equipment {
                    id: new_id().into(),
                    ..equipment
                };
                let transaction = connection.transaction()?;
                transaction.execute(
                    "INSERT INTO equipment (id, name, description, equipment_type, created_by)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        *equipment.id,
                        equipment.name.as_ref(),
                        equipment.description,
                        equipment.equipment_type.as_ref(),
                        *equipment.created_by
                    ],
                )?;
                insert_variations(&transaction, &equipment)?;
                transaction.commit()?;
                Ok(equipment)
            })
            .await?)
    }

    async fn replace_equipment(
        &self,
        equipment: domain::Equipment,
    ) -> Result<domain::Equipment, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction = connection.transaction()?;
                let updated = transaction.execute(
                    "UPDATE equipment SET name = ?2, description = ?3, equipment_type = ?4
                    WHERE id = ?1",
                    params![
                        *equipment.id,
                        equipment.name.as_ref(),
                        equipment.description,
                        equipment.equipment_type.as_ref()
                    ],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }
                transaction.execute(
                    "DELETE FROM equipment_variations WHERE equipment_id = ?1",
                    params![*equipment.id],
                )?;
                insert_variations(&transaction, &equipment)?;
                transaction.commit()?;
                Ok(equipment)
            })
            .await?)
    }

    async fn delete_equipment(
        &self,
        id: domain::EquipmentID,
    ) -> Result<domain::EquipmentID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM equipment WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }
}
