//! Foreign key definitions.

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A foreign key from `column` to `on(references)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    /// Local column.
    pub column: String,
    /// Referenced column.
    pub references: Option<String>,
    /// Referenced table.
    pub on: Option<String>,
    /// Constraint name; derived from table and column when absent.
    pub name: Option<String>,
    /// ON DELETE action.
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action.
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKeyDef {
    /// Creates a foreign key on `column` with no target yet.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            references: None,
            on: None,
            name: None,
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the referenced column.
    pub fn references(&mut self, column: &str) -> &mut Self {
        self.references = Some(column.to_string());
        self
    }

    /// Sets the referenced table.
    pub fn on(&mut self, table: &str) -> &mut Self {
        self.on = Some(table.to_string());
        self
    }

    /// Overrides the constraint name.
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the ON DELETE action.
    pub fn on_delete(&mut self, action: ForeignKeyAction) -> &mut Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    pub fn on_update(&mut self, action: ForeignKeyAction) -> &mut Self {
        self.on_update = Some(action);
        self
    }

    /// `ON DELETE CASCADE`
    pub fn cascade_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::Cascade)
    }

    /// `ON DELETE RESTRICT`
    pub fn restrict_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::Restrict)
    }

    /// `ON DELETE SET NULL`
    pub fn null_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::SetNull)
    }

    /// `ON UPDATE CASCADE`
    pub fn cascade_on_update(&mut self) -> &mut Self {
        self.on_update(ForeignKeyAction::Cascade)
    }

    /// `ON UPDATE RESTRICT`
    pub fn restrict_on_update(&mut self) -> &mut Self {
        self.on_update(ForeignKeyAction::Restrict)
    }

    /// `ON UPDATE SET NULL`
    pub fn null_on_update(&mut self) -> &mut Self {
        self.on_update(ForeignKeyAction::SetNull)
    }

    /// Constraint name, `<table>_<column>_foreign` unless overridden.
    #[must_use]
    pub fn constraint_name(&self, table: &str) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{table}_{}_foreign", self.column))
    }

    /// Returns `(referenced table, referenced column)`.
    ///
    /// # Errors
    ///
    /// [`CompileError::IncompleteForeignKey`](crate::CompileError::IncompleteForeignKey)
    /// when either is missing.
    pub fn target(&self, table: &str) -> Result<(&str, &str), crate::CompileError> {
        match (&self.on, &self.references) {
            (Some(on), Some(references)) => Ok((on.as_str(), references.as_str())),
            _ => Err(crate::CompileError::IncompleteForeignKey {
                table: table.to_string(),
                column: self.column.clone(),
            }),
        }
    }

    /// Renders the trailing ` ON DELETE .. ON UPDATE ..` actions.
    #[must_use]
    pub fn actions_sql(&self) -> String {
        let mut sql = String::new();
        if let Some(action) = self.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = self.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_name_is_derived() {
        let fk = ForeignKeyDef::new("user_id");
        assert_eq!(fk.constraint_name("posts"), "posts_user_id_foreign");

        let mut named = ForeignKeyDef::new("user_id");
        named.name("fk_author");
        assert_eq!(named.constraint_name("posts"), "fk_author");
    }

    #[test]
    fn test_target_requires_table_and_column() {
        let mut fk = ForeignKeyDef::new("user_id");
        fk.references("id");
        assert!(fk.target("posts").is_err());
        fk.on("users");
        assert_eq!(fk.target("posts").unwrap(), ("users", "id"));
    }

    #[test]
    fn test_actions_sql() {
        let mut fk = ForeignKeyDef::new("user_id");
        fk.cascade_on_delete().null_on_update();
        assert_eq!(fk.actions_sql(), " ON DELETE CASCADE ON UPDATE SET NULL");
    }
}
