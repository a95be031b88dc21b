use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_item_catalog_tables::Migration),
            Box::new(m20240101_000002_create_requests_table::Migration),
            Box::new(m20240101_000003_create_request_detail_tables::Migration),
            Box::new(m20240101_000004_create_request_accepts_table::Migration),
            Box::new(m20240101_000005_create_inventory_items_table::Migration),
            Box::new(m20240101_000006_create_lends_table::Migration),
            Box::new(m20240101_000007_create_provides_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_item_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_item_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ItemCategories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemCategories::CategoryId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ItemCategories::CategoryName)
                                .string()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::ItemId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Items::ItemName).string().not_null())
                        .col(ColumnDef::new(Items::Unit).string().null())
                        .col(ColumnDef::new(Items::CategoryId).uuid().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_category")
                                .from(Items::Table, Items::CategoryId)
                                .to(ItemCategories::Table, ItemCategories::CategoryId),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ItemCategories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ItemCategories {
        Table,
        CategoryId,
        CategoryName,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        ItemId,
        ItemName,
        Unit,
        CategoryId,
    }
}

mod m20240101_000002_create_requests_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Requests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Requests::RequestId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Requests::RequesterId).uuid().not_null())
                        .col(ColumnDef::new(Requests::IncidentId).uuid().null())
                        .col(ColumnDef::new(Requests::Type).string().not_null())
                        .col(
                            ColumnDef::new(Requests::RequiredQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Requests::CurrentQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Requests::Status).string().not_null())
                        .col(ColumnDef::new(Requests::Urgency).integer().not_null())
                        .col(ColumnDef::new(Requests::ReviewStatus).string().null())
                        .col(ColumnDef::new(Requests::Address).string().null())
                        .col(
                            ColumnDef::new(Requests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Requests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_requests_requester")
                        .table(Requests::Table)
                        .col(Requests::RequesterId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_requests_incident")
                        .table(Requests::Table)
                        .col(Requests::IncidentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Requests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Requests {
        Table,
        RequestId,
        RequesterId,
        IncidentId,
        Type,
        RequiredQty,
        CurrentQty,
        Status,
        Urgency,
        ReviewStatus,
        Address,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_request_detail_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_request_detail_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RequestItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(RequestItems::RequestId).uuid().not_null())
                        .col(ColumnDef::new(RequestItems::ItemId).uuid().not_null())
                        .col(ColumnDef::new(RequestItems::Qty).integer().not_null())
                        .primary_key(
                            Index::create()
                                .col(RequestItems::RequestId)
                                .col(RequestItems::ItemId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_items_request")
                                .from(RequestItems::Table, RequestItems::RequestId)
                                .to(Requests::Table, Requests::RequestId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequestEquipments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequestEquipments::EquipmentId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestEquipments::RequestId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestEquipments::EquipmentName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RequestEquipments::Qty).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_equipments_request")
                                .from(RequestEquipments::Table, RequestEquipments::RequestId)
                                .to(Requests::Table, Requests::RequestId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequestSkills::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(RequestSkills::RequestId).uuid().not_null())
                        .col(ColumnDef::new(RequestSkills::SkillTag).string().not_null())
                        .primary_key(
                            Index::create()
                                .col(RequestSkills::RequestId)
                                .col(RequestSkills::SkillTag),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_skills_request")
                                .from(RequestSkills::Table, RequestSkills::RequestId)
                                .to(Requests::Table, Requests::RequestId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RequestSkills::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RequestEquipments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RequestItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Requests {
        Table,
        RequestId,
    }

    #[derive(DeriveIden)]
    enum RequestItems {
        Table,
        RequestId,
        ItemId,
        Qty,
    }

    #[derive(DeriveIden)]
    enum RequestEquipments {
        Table,
        EquipmentId,
        RequestId,
        EquipmentName,
        Qty,
    }

    #[derive(DeriveIden)]
    enum RequestSkills {
        Table,
        RequestId,
        SkillTag,
    }
}

mod m20240101_000004_create_request_accepts_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_request_accepts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RequestAccepts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(RequestAccepts::RequestId).uuid().not_null())
                        .col(ColumnDef::new(RequestAccepts::AccepterId).uuid().not_null())
                        .col(ColumnDef::new(RequestAccepts::Qty).integer().not_null())
                        .col(
                            ColumnDef::new(RequestAccepts::Eta)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(RequestAccepts::Description).string().null())
                        .col(ColumnDef::new(RequestAccepts::Source).string().null())
                        .col(
                            ColumnDef::new(RequestAccepts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(RequestAccepts::RequestId)
                                .col(RequestAccepts::AccepterId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_accepts_request")
                                .from(RequestAccepts::Table, RequestAccepts::RequestId)
                                .to(Requests::Table, Requests::RequestId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_request_accepts_accepter")
                        .table(RequestAccepts::Table)
                        .col(RequestAccepts::AccepterId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RequestAccepts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Requests {
        Table,
        RequestId,
    }

    #[derive(DeriveIden)]
    enum RequestAccepts {
        Table,
        RequestId,
        AccepterId,
        Qty,
        Eta,
        Description,
        Source,
        CreatedAt,
    }
}

mod m20240101_000005_create_inventory_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(InventoryItems::InventoryId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::ItemId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::Status).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::Qty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(InventoryItems::InventoryId)
                                .col(InventoryItems::ItemId)
                                .col(InventoryItems::Status),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        InventoryId,
        ItemId,
        Status,
        Qty,
        UpdatedAt,
    }
}

mod m20240101_000006_create_lends_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_lends_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Lends::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Lends::LendId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Lends::UserId).uuid().not_null())
                        .col(ColumnDef::new(Lends::ItemId).uuid().not_null())
                        .col(ColumnDef::new(Lends::Qty).integer().not_null())
                        .col(ColumnDef::new(Lends::FromInventoryId).uuid().not_null())
                        .col(
                            ColumnDef::new(Lends::LendAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Lends::ReturnedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_lends_user")
                        .table(Lends::Table)
                        .col(Lends::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_lends_inventory")
                        .table(Lends::Table)
                        .col(Lends::FromInventoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Lends::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Lends {
        Table,
        LendId,
        UserId,
        ItemId,
        Qty,
        FromInventoryId,
        LendAt,
        ReturnedAt,
    }
}

mod m20240101_000007_create_provides_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_provides_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Provides::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Provides::ProvideId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Provides::UserId).uuid().not_null())
                        .col(ColumnDef::new(Provides::ItemId).uuid().not_null())
                        .col(ColumnDef::new(Provides::Qty).integer().not_null())
                        .col(ColumnDef::new(Provides::InventoryId).uuid().not_null())
                        .col(
                            ColumnDef::new(Provides::ProvideDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_provides_user")
                        .table(Provides::Table)
                        .col(Provides::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Provides::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Provides {
        Table,
        ProvideId,
        UserId,
        ItemId,
        Qty,
        InventoryId,
        ProvideDate,
    }
}
