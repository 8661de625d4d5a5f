use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::Password))
                    .col(string_len(Users::Role, 16).default("user"))
                    .col(string_null(Users::Name))
                    .col(string_null(Users::Phone))
                    .col(string_null(Users::Address))
                    .col(string_null(Users::City))
                    .col(boolean(Users::Enabled).default(true))
                    .col(integer(Users::Points).default(0))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::NameAr))
                    .col(string(Categories::NameEn))
                    .col(string(Categories::Slug).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create books table
        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(pk_auto(Books::Id))
                    .col(string(Books::TitleAr))
                    .col(string(Books::TitleEn))
                    .col(string(Books::Author))
                    .col(text(Books::DescriptionAr))
                    .col(text(Books::DescriptionEn))
                    .col(decimal(Books::Price).decimal_len(12, 2))
                    .col(string(Books::Category))
                    .col(integer_null(Books::CategoryId))
                    .col(string(Books::Image))
                    .col(string(Books::Language))
                    .col(boolean(Books::Published).default(true))
                    .col(string_null(Books::Isbn))
                    .col(integer(Books::Stock).default(0))
                    .col(timestamp_with_time_zone(Books::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_category")
                            .from(Books::Table, Books::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_books_category_id")
                    .table(Books::Table)
                    .col(Books::CategoryId)
                    .to_owned(),
            )
            .await?;

        // Create wilayas table
        manager
            .create_table(
                Table::create()
                    .table(Wilayas::Table)
                    .if_not_exists()
                    .col(pk_auto(Wilayas::Id))
                    .col(integer(Wilayas::Code).unique_key())
                    .col(string(Wilayas::NameAr))
                    .col(string(Wilayas::NameEn))
                    .col(decimal(Wilayas::ShippingPrice).decimal_len(12, 2))
                    .col(boolean(Wilayas::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wilayas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    Password,
    Role,
    Name,
    Phone,
    Address,
    City,
    Enabled,
    Points,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    NameAr,
    NameEn,
    Slug,
}

#[derive(DeriveIden)]
pub(crate) enum Books {
    Table,
    Id,
    TitleAr,
    TitleEn,
    Author,
    DescriptionAr,
    DescriptionEn,
    Price,
    Category,
    CategoryId,
    Image,
    Language,
    Published,
    Isbn,
    Stock,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Wilayas {
    Table,
    Id,
    Code,
    NameAr,
    NameEn,
    ShippingPrice,
    IsActive,
}
