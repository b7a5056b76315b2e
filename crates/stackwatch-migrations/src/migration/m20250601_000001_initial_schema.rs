use sea_orm_migration::prelude::*;

/// Initial schema: one table per entity, no foreign keys. All references
/// between tables are logical ids with no integrity constraint.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create services table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("services"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("type")).string().not_null())
                    .col(ColumnDef::new(Alias::new("status")).string().not_null())
                    .col(ColumnDef::new(Alias::new("port")).integer().null())
                    .col(ColumnDef::new(Alias::new("cpu")).double().null())
                    .col(ColumnDef::new(Alias::new("memory")).double().null())
                    .col(ColumnDef::new(Alias::new("instances")).integer().null())
                    .col(ColumnDef::new(Alias::new("version")).string().null())
                    .col(
                        ColumnDef::new(Alias::new("spring_boot_version"))
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Alias::new("java_version")).string().null())
                    .col(ColumnDef::new(Alias::new("framework")).string().null())
                    .col(ColumnDef::new(Alias::new("profiles")).string().null())
                    .col(ColumnDef::new(Alias::new("actuator_port")).integer().null())
                    .col(ColumnDef::new(Alias::new("config")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create deployments table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("deployments"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("version")).string().not_null())
                    .col(ColumnDef::new(Alias::new("status")).string().not_null())
                    .col(ColumnDef::new(Alias::new("service_id")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("strategy")).string().null())
                    .col(ColumnDef::new(Alias::new("progress")).integer().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("completed_at"))
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create activities table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("activities"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("type")).string().not_null())
                    .col(ColumnDef::new(Alias::new("message")).string().not_null())
                    .col(ColumnDef::new(Alias::new("service_id")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("severity")).string().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create test_results table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("test_results"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("framework")).string().not_null())
                    .col(ColumnDef::new(Alias::new("test_type")).string().not_null())
                    .col(ColumnDef::new(Alias::new("service_id")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("passed")).integer().null())
                    .col(ColumnDef::new(Alias::new("failed")).integer().null())
                    .col(ColumnDef::new(Alias::new("coverage")).double().null())
                    .col(ColumnDef::new(Alias::new("duration")).integer().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create api_routes table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("api_routes"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("path")).string().not_null())
                    .col(ColumnDef::new(Alias::new("method")).string().not_null())
                    .col(ColumnDef::new(Alias::new("gateway_id")).big_integer().null())
                    .col(
                        ColumnDef::new(Alias::new("target_service"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_active"))
                            .boolean()
                            .null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Alias::new("rate_limit")).integer().null())
                    .col(ColumnDef::new(Alias::new("timeout")).integer().null())
                    .to_owned(),
            )
            .await?;

        // Create metrics table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("metrics"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("service_id")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("cpu")).double().null())
                    .col(ColumnDef::new(Alias::new("memory")).double().null())
                    .col(ColumnDef::new(Alias::new("request_count")).integer().null())
                    .col(ColumnDef::new(Alias::new("response_time")).double().null())
                    .col(ColumnDef::new(Alias::new("error_rate")).double().null())
                    .col(
                        ColumnDef::new(Alias::new("timestamp"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            "metrics",
            "api_routes",
            "test_results",
            "activities",
            "deployments",
            "services",
        ] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }

        Ok(())
    }
}
